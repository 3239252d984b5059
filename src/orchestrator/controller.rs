//! Backend call dispatcher.
//!
//! Receives commands from the UI thread, runs each call as its own task and emits the completed
//! outcome back. Calls are not serialized: overlapping requests run concurrently and the
//! workflow layer decides which responses still matter.

use crate::backend::BackendClient;
use crate::model::{BackendCommand, BackendEvent};
use anyhow::Result;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;

/// Execute a single command against the backend.
async fn perform(client: &BackendClient, cmd: BackendCommand) -> BackendEvent {
    match cmd {
        BackendCommand::Search { seq, request } => BackendEvent::SearchCompleted {
            seq,
            outcome: client.search(&request).await,
        },
        BackendCommand::Analyze { seq, request } => BackendEvent::AnalysisCompleted {
            seq,
            outcome: client.synthesize(&request).await,
        },
        BackendCommand::LoadDocuments { seq } => BackendEvent::DocumentsLoaded {
            seq,
            outcome: client.list_documents().await,
        },
        BackendCommand::CreateDocument { seq, document } => BackendEvent::DocumentCreated {
            seq,
            outcome: client.create_document(&document).await.map(Box::new),
        },
        BackendCommand::DeleteDocument { id } => BackendEvent::DocumentDeleted {
            id,
            outcome: client.delete_document(id).await,
        },
    }
}

/// Dispatch commands until the command channel closes, then abort whatever is still in flight.
pub(crate) async fn run_controller(
    client: BackendClient,
    event_tx: UnboundedSender<BackendEvent>,
    mut cmd_rx: UnboundedReceiver<BackendCommand>,
) -> Result<()> {
    let mut in_flight: JoinSet<BackendEvent> = JoinSet::new();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(cmd) => {
                        tracing::debug!(?cmd, "dispatching backend call");
                        let client = client.clone();
                        in_flight.spawn(async move { perform(&client, cmd).await });
                    }
                    None => {
                        if !in_flight.is_empty() {
                            tracing::debug!(pending = in_flight.len(), "aborting in-flight calls");
                        }
                        in_flight.abort_all();
                        break;
                    }
                }
            }
            // join_next resolves to None immediately on an empty set; park instead of spinning.
            done = async {
                if in_flight.is_empty() {
                    futures::future::pending().await
                } else {
                    in_flight.join_next().await
                }
            } => {
                match done {
                    Some(Ok(ev)) => {
                        if event_tx.send(ev).is_err() {
                            // UI is gone; nothing left to report to.
                            in_flight.abort_all();
                            break;
                        }
                    }
                    Some(Err(e)) if e.is_cancelled() => {}
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "backend task failed");
                    }
                    None => {}
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClientConfig, SearchRequest};
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BackendClient {
        BackendClient::new(&ClientConfig {
            api_url: server.uri(),
            search_limit: 10,
            timeout: None,
            user_agent: "omnimind-cli/test".into(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn overlapping_calls_all_report_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/search/unified"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"results": []}))
                    .set_delay(Duration::from_millis(50)),
            )
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/vault/documents/3"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let controller = tokio::spawn(run_controller(client_for(&server), event_tx, cmd_rx));

        for seq in [1, 2] {
            cmd_tx
                .send(BackendCommand::Search {
                    seq,
                    request: SearchRequest {
                        query: "q".into(),
                        limit: 10,
                    },
                })
                .unwrap();
        }
        cmd_tx.send(BackendCommand::DeleteDocument { id: 3 }).unwrap();

        let mut seen_searches = Vec::new();
        let mut delete_failed = false;
        for _ in 0..3 {
            match event_rx.recv().await.unwrap() {
                BackendEvent::SearchCompleted { seq, outcome } => {
                    assert!(outcome.is_ok());
                    seen_searches.push(seq);
                }
                BackendEvent::DocumentDeleted { id, outcome } => {
                    assert_eq!(id, 3);
                    delete_failed = outcome.is_err();
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
        seen_searches.sort();
        assert_eq!(seen_searches, vec![1, 2]);
        assert!(delete_failed);

        drop(cmd_tx);
        controller.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn closing_commands_stops_controller() {
        let server = MockServer::start().await;
        let (event_tx, _event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<BackendCommand>();
        drop(cmd_tx);
        run_controller(client_for(&server), event_tx, cmd_rx)
            .await
            .unwrap();
    }
}
