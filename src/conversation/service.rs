//! Public entry points: one conversation turn per call.

use std::sync::Arc;

use futures::stream::{BoxStream, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::{PhiloError, Result, WorkflowStage};
use crate::models::ModelSelector;
use crate::provider::{self, ModelProvider};
use crate::store::{FileConnector, StoreConnector};
use crate::types::ThreadId;

use super::chains::{ResponseChain, SummaryChain};
use super::normalize::MessageInput;
use super::persona::Persona;
use super::state::ConversationState;
use super::workflow::{Workflow, WorkflowEvent, WorkflowEventSink};

/// Runs conversation turns for any persona.
///
/// `get_response` keeps no state between calls: the caller passes the whole
/// history it wants considered. `get_streaming_response` resumes and saves
/// the thread through the session store.
#[derive(Clone)]
pub struct ConversationService {
    inner: Arc<Inner>,
}

struct Inner {
    workflow: Workflow,
    connector: Arc<dyn StoreConnector>,
}

impl ConversationService {
    pub fn new(workflow: Workflow, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            inner: Arc::new(Inner {
                workflow,
                connector,
            }),
        }
    }

    /// Build providers, chains and the file-backed store from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let response_model = ModelSelector::parse_with_default(&settings.llm_model, "groq")?;
        let summary_model = ModelSelector::parse_with_default(&settings.llm_model_summary, "groq")?;
        let response_provider: Arc<dyn ModelProvider> =
            Arc::from(provider::create_provider(&response_model, settings)?);
        let summary_provider: Arc<dyn ModelProvider> =
            Arc::from(provider::create_provider(&summary_model, settings)?);

        let workflow = Workflow::from_settings(
            ResponseChain::new(response_provider),
            SummaryChain::new(summary_provider),
            settings,
        );
        Ok(Self::new(
            workflow,
            Arc::new(FileConnector::from_settings(settings)),
        ))
    }

    /// Run one turn and return the reply text with the final state.
    ///
    /// Nothing is loaded from or saved to the session store.
    pub async fn get_response(
        &self,
        messages: impl Into<MessageInput>,
        persona: &Persona,
        new_thread: bool,
    ) -> Result<(String, ConversationState)> {
        let thread_id = ThreadId::resolve(&persona.id, new_thread);
        let turns = messages.into().into_turns();
        info!(%thread_id, persona = %persona.name, turns = turns.len(), "running conversation");

        let state = ConversationState::new(persona.clone()).with_turns(turns);
        match self.inner.workflow.invoke(state).await {
            Ok(run) => Ok((run.reply.content().to_string(), run.state)),
            Err(err) => {
                warn!(%thread_id, error = %err, "conversation workflow failed");
                Err(PhiloError::workflow(WorkflowStage::Conversation, err))
            }
        }
    }

    /// Run one turn on the persisted thread, yielding reply fragments as the
    /// model produces them.
    ///
    /// Nothing happens until the stream is first polled. The stream ends once
    /// the run is finished and the thread is saved; a failure is yielded as a
    /// single error after any fragments already sent, and nothing is saved.
    /// Dropping the stream does not cancel a run in flight.
    pub fn get_streaming_response(
        &self,
        messages: impl Into<MessageInput>,
        persona: &Persona,
        new_thread: bool,
    ) -> BoxStream<'static, Result<String>> {
        let inner = self.inner.clone();
        let input = messages.into();
        let persona = persona.clone();

        futures::stream::once(async move {
            let (tx, rx) = mpsc::unbounded_channel();
            tokio::spawn(async move {
                let thread_id = ThreadId::resolve(&persona.id, new_thread);
                let result = inner
                    .run_streaming(&thread_id, input, persona, tx.clone())
                    .await;
                if let Err(err) = result {
                    warn!(%thread_id, error = %err, "streaming conversation workflow failed");
                    let err = PhiloError::workflow(WorkflowStage::Streaming, err);
                    let _ = tx.send(Err(err));
                }
            });
            UnboundedReceiverStream::new(rx)
        })
        .flatten()
        .boxed()
    }

    /// [`Self::get_response`] for loosely-typed JSON messages.
    pub async fn get_response_json(
        &self,
        messages: &Value,
        persona: &Persona,
        new_thread: bool,
    ) -> Result<(String, ConversationState)> {
        let input = MessageInput::from_json(messages)
            .map_err(|err| PhiloError::workflow(WorkflowStage::Conversation, err))?;
        self.get_response(input, persona, new_thread).await
    }

    /// [`Self::get_streaming_response`] for loosely-typed JSON messages.
    ///
    /// Input that fails validation yields a single error and never touches
    /// the session store.
    pub fn get_streaming_response_json(
        &self,
        messages: &Value,
        persona: &Persona,
        new_thread: bool,
    ) -> BoxStream<'static, Result<String>> {
        match MessageInput::from_json(messages) {
            Ok(input) => self.get_streaming_response(input, persona, new_thread),
            Err(err) => futures::stream::once(futures::future::ready(Err(
                PhiloError::workflow(WorkflowStage::Streaming, err),
            )))
            .boxed(),
        }
    }
}

impl Inner {
    async fn run_streaming(
        &self,
        thread_id: &ThreadId,
        input: MessageInput,
        persona: Persona,
        tx: mpsc::UnboundedSender<Result<String>>,
    ) -> Result<()> {
        let turns = input.into_turns();
        info!(
            %thread_id,
            persona = %persona.name,
            turns = turns.len(),
            "running streaming conversation"
        );

        // Scope lives until this function returns, on every path.
        let store = self.connector.connect().await?;
        let checkpoint = store.load(thread_id).await?;
        let state = ConversationState::resume(checkpoint, persona).with_turns(turns);

        let sink: WorkflowEventSink = Arc::new(move |event: WorkflowEvent| {
            if let WorkflowEvent::AgentDelta { text } = event {
                let _ = tx.send(Ok(text));
            }
        });
        let run = self.workflow.stream(state, sink).await?;

        store.save(&run.state.to_checkpoint(thread_id)).await?;
        info!(
            %thread_id,
            turns = run.state.turns.len(),
            summarized = run.summarized,
            "thread saved"
        );
        Ok(())
    }
}
