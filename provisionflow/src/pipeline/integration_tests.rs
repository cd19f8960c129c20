//! Integration tests driving whole pipelines across invocations.

#[cfg(test)]
mod tests {
    use crate::core::{CallbackState, OperationKind, OutcomeCode, ResourceModel};
    use crate::events::{self, CollectingEventSink};
    use crate::orchestrator::{InvocationRequest, Orchestrator};
    use crate::pipeline::PipelineBuilder;
    use crate::policy::{Exhaustion, PropagationGate, PropagationPolicy, StabilizationPolicy, Stabilize};
    use crate::stages::{FnStage, MarkComplete, Stage, StageContext, StageResult};
    use crate::testing::{
        assert_envelope_failed, assert_envelope_in_progress, assert_envelope_succeeded,
        drive_to_completion, SampleModel,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct CountingStage {
        name: &'static str,
        counter: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Stage<SampleModel> for CountingStage {
        fn name(&self) -> &str {
            self.name
        }

        async fn execute(&self, ctx: StageContext<'_, SampleModel>) -> StageResult<SampleModel> {
            self.counter.fetch_add(1, Ordering::SeqCst);
            ctx.proceed()
        }
    }

    /// Assigns an identifier only from the `ready_on`-th call onwards.
    #[derive(Debug)]
    struct EventuallyAssigns {
        ready_on: usize,
        counter: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Stage<SampleModel> for EventuallyAssigns {
        fn name(&self) -> &str {
            "assign"
        }

        async fn execute(&self, ctx: StageContext<'_, SampleModel>) -> StageResult<SampleModel> {
            let call = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            if call < self.ready_on {
                return ctx.proceed();
            }
            let mut model = ctx.model;
            model.set_primary_identifier("sample-1".to_string());
            StageResult::proceed(model, ctx.state.with_primary_identifier("sample-1"))
        }
    }

    #[derive(Debug)]
    struct WaitOnce;

    #[async_trait]
    impl Stage<SampleModel> for WaitOnce {
        fn name(&self) -> &str {
            "wait-once"
        }

        async fn execute(&self, ctx: StageContext<'_, SampleModel>) -> StageResult<SampleModel> {
            if ctx.state.extra("waited").is_some() {
                return ctx.proceed();
            }
            let state = ctx.state.with_extra("waited", serde_json::json!(true));
            StageResult::suspend(ctx.model, state, 3)
        }
    }

    fn has_id(model: &SampleModel) -> bool {
        model.primary_identifier().is_some()
    }

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    #[tokio::test]
    async fn test_create_flow_stabilizes_then_propagates() {
        let assigns = counter();
        let side_effects = counter();
        let assign: Arc<dyn Stage<SampleModel>> = Arc::new(EventuallyAssigns {
            ready_on: 3,
            counter: assigns.clone(),
        });
        let side_effect: Arc<dyn Stage<SampleModel>> = Arc::new(CountingStage {
            name: "side-effect",
            counter: side_effects.clone(),
        });

        let pipeline = PipelineBuilder::<SampleModel>::new("create")
            .stage(Stabilize::new(assign, has_id, StabilizationPolicy::default()))
            .stage(PropagationGate::new(
                PropagationPolicy::default().with_cycles(2).with_delay_seconds(7),
            ))
            .stage(MarkComplete::new(side_effect))
            .build()
            .unwrap();
        let orchestrator = Orchestrator::new().with_pipeline(OperationKind::Create, Arc::new(pipeline));

        let envelopes = drive_to_completion(
            &orchestrator,
            InvocationRequest::create(SampleModel::new().with_attr("size", "small")),
            10,
        )
        .await;

        let delays: Vec<u32> = envelopes.iter().map(|e| e.callback_delay_seconds).collect();
        assert_eq!(delays, vec![5, 5, 7, 7, 0]);
        assert_envelope_in_progress(&envelopes[2], 7);

        let last = envelopes.last().unwrap();
        assert_envelope_succeeded(last);
        let model = last.resource_model.as_ref().unwrap();
        assert_eq!(model.primary_identifier(), Some("sample-1"));
        assert_eq!(model.attr("size"), Some("small"));

        assert_eq!(assigns.load(Ordering::SeqCst), 3);
        assert_eq!(side_effects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_strict_exhaustion_fails_after_bounded_attempts() {
        let calls = counter();
        let never: Arc<dyn Stage<SampleModel>> = Arc::new(CountingStage {
            name: "never-converges",
            counter: calls.clone(),
        });
        let policy = StabilizationPolicy::default()
            .with_max_attempts(2)
            .with_on_exhausted(Exhaustion::Fail(OutcomeCode::ResourceConflict));

        let pipeline = PipelineBuilder::<SampleModel>::new("create")
            .stage(Stabilize::new(never, has_id, policy))
            .build()
            .unwrap();
        let orchestrator = Orchestrator::new().with_pipeline(OperationKind::Create, Arc::new(pipeline));

        let envelopes =
            drive_to_completion(&orchestrator, InvocationRequest::create(SampleModel::new()), 10).await;

        assert_eq!(envelopes.len(), 3);
        assert_envelope_failed(envelopes.last().unwrap(), OutcomeCode::ResourceConflict);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_lenient_exhaustion_succeeds_after_bounded_attempts() {
        let calls = counter();
        let after = counter();
        let never: Arc<dyn Stage<SampleModel>> = Arc::new(CountingStage {
            name: "never-converges",
            counter: calls.clone(),
        });
        let policy = StabilizationPolicy::default()
            .with_max_attempts(3)
            .with_on_exhausted(Exhaustion::Succeed);

        let pipeline = PipelineBuilder::<SampleModel>::new("create")
            .stage(Stabilize::new(never, has_id, policy))
            .stage(CountingStage {
                name: "after",
                counter: after.clone(),
            })
            .build()
            .unwrap();
        let orchestrator = Orchestrator::new().with_pipeline(OperationKind::Create, Arc::new(pipeline));

        let envelopes =
            drive_to_completion(&orchestrator, InvocationRequest::create(SampleModel::new()), 10).await;

        assert_eq!(envelopes.len(), 4);
        for (attempt, envelope) in (1u32..).zip(&envelopes[..3]) {
            assert_envelope_in_progress(envelope, 5);
            assert_eq!(
                envelope.callback_state.as_ref().map(|s| s.stabilization_count),
                Some(attempt)
            );
        }
        assert_envelope_succeeded(envelopes.last().unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(after.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_short_circuits_remaining_stages() {
        let later = counter();
        let pipeline = PipelineBuilder::<SampleModel>::new("read")
            .stage(FnStage::new("lookup", |ctx: StageContext<'_, SampleModel>| {
                StageResult::fail(ctx.model, OutcomeCode::NotFound, "no such sample")
            }))
            .stage(CountingStage {
                name: "after",
                counter: later.clone(),
            })
            .build()
            .unwrap();
        let orchestrator = Orchestrator::new().with_pipeline(OperationKind::Read, Arc::new(pipeline));

        let envelope = orchestrator
            .handle(InvocationRequest::read(SampleModel::with_id("sample-9")))
            .await;

        assert_envelope_failed(&envelope, OutcomeCode::NotFound);
        assert_eq!(envelope.message.as_deref(), Some("no such sample"));
        assert_eq!(later.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_completed_stages_are_skipped_on_resume() {
        let effects = counter();
        let effect: Arc<dyn Stage<SampleModel>> = Arc::new(CountingStage {
            name: "effect",
            counter: effects.clone(),
        });
        let pipeline = PipelineBuilder::<SampleModel>::new("update")
            .stage(MarkComplete::new(effect))
            .stage(WaitOnce)
            .build()
            .unwrap();
        let sink = Arc::new(CollectingEventSink::new());
        let orchestrator = Orchestrator::new()
            .with_pipeline(OperationKind::Update, Arc::new(pipeline))
            .with_event_sink(sink.clone());

        let envelopes = drive_to_completion(
            &orchestrator,
            InvocationRequest::update(SampleModel::with_id("sample-1"), None),
            5,
        )
        .await;

        assert_eq!(envelopes.len(), 2);
        assert_envelope_in_progress(&envelopes[0], 3);
        assert_envelope_succeeded(&envelopes[1]);
        assert_eq!(effects.load(Ordering::SeqCst), 1);
        assert_eq!(sink.events_of_type(events::STAGE_SKIPPED).len(), 1);
        assert_eq!(sink.events_of_type(events::INVOCATION_COMPLETED).len(), 2);
    }

    #[tokio::test]
    async fn test_done_ends_list_early() {
        let later = counter();
        let pipeline = PipelineBuilder::<SampleModel>::new("list")
            .stage(FnStage::new("page", |_ctx: StageContext<'_, SampleModel>| {
                StageResult::done_list(
                    vec![SampleModel::with_id("a"), SampleModel::with_id("b")],
                    Some("2".to_string()),
                )
            }))
            .stage(CountingStage {
                name: "unreachable",
                counter: later.clone(),
            })
            .build()
            .unwrap();
        let orchestrator = Orchestrator::new().with_pipeline(OperationKind::List, Arc::new(pipeline));

        let envelope = orchestrator
            .handle(InvocationRequest::list(SampleModel::new(), None))
            .await;

        assert_envelope_succeeded(&envelope);
        assert_eq!(envelope.resource_models.map(|m| m.len()), Some(2));
        assert_eq!(envelope.next_token.as_deref(), Some("2"));
        assert_eq!(later.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resumed_state_is_carried_verbatim() {
        let pipeline = PipelineBuilder::<SampleModel>::new("create")
            .stage(WaitOnce)
            .build()
            .unwrap();
        let orchestrator = Orchestrator::new().with_pipeline(OperationKind::Create, Arc::new(pipeline));

        let state = CallbackState::new().with_extra("waited", serde_json::json!(true));
        let envelope = orchestrator
            .handle(InvocationRequest::create(SampleModel::new()).with_callback_state(Some(state)))
            .await;

        assert_envelope_succeeded(&envelope);
    }

    #[test]
    fn test_duplicate_stage_names_are_rejected() {
        let result = PipelineBuilder::<SampleModel>::new("create")
            .stage(WaitOnce)
            .stage(WaitOnce)
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_empty_pipeline_is_rejected() {
        assert!(PipelineBuilder::<SampleModel>::new("create").build().is_err());
        assert!(PipelineBuilder::<SampleModel>::new("  ")
            .stage(WaitOnce)
            .build()
            .is_err());
    }
}
