//! Collaborative invocation of every extension on a kind.

use super::{ExtensionEntry, ExtensionRegistry};
use crate::{config::EnrichmentMode, guard};
use futures::future::join_all;
use kindred_core::{QualifiedName, Reply, RequestContext, ResourceChain, ResourceKind};
use tracing::Instrument;

/// One extension's successful reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    /// Which extension replied.
    pub name: QualifiedName,
    /// What it replied.
    pub reply: Reply,
}

impl ExtensionRegistry {
    /// Run every extension of `kind` with the configured execution mode.
    ///
    /// See [`invoke_all_with`](Self::invoke_all_with).
    pub async fn invoke_all(
        &self,
        kind: ResourceKind,
        chain: &ResourceChain,
        ctx: &RequestContext,
    ) -> Vec<Contribution> {
        self.invoke_all_with(self.config.enrichment, kind, chain, ctx)
            .await
    }

    /// Run every extension of `kind` against the same chain and context.
    ///
    /// Replies come back in registration order whatever the mode. An
    /// extension that fails to build, fails when run or panics is logged and
    /// left out; it never fails the others.
    pub async fn invoke_all_with(
        &self,
        mode: EnrichmentMode,
        kind: ResourceKind,
        chain: &ResourceChain,
        ctx: &RequestContext,
    ) -> Vec<Contribution> {
        let extensions = self.list_for(kind);
        let span = tracing::debug_span!(
            "invoke_all",
            kind = self.forest.name(kind),
            extensions = extensions.len(),
            ?mode
        );

        async {
            let replies = match mode {
                EnrichmentMode::Sequential => {
                    let mut replies = Vec::with_capacity(extensions.len());
                    for entry in &extensions {
                        replies.push(run_one(entry, chain, ctx.clone()).await);
                    }
                    replies
                }
                EnrichmentMode::Concurrent => {
                    let runs = extensions.iter().map(|entry| run_one(entry, chain, ctx.clone()));
                    join_all(runs).await
                }
            };

            extensions
                .iter()
                .zip(replies)
                .filter_map(|(entry, reply)| {
                    Some(Contribution {
                        name: entry.name.clone(),
                        reply: reply?,
                    })
                })
                .collect()
        }
        .instrument(span)
        .await
    }
}

async fn run_one(
    entry: &ExtensionEntry,
    chain: &ResourceChain,
    ctx: RequestContext,
) -> Option<Reply> {
    let outcome = match guard::build(&*entry.factory, chain, ctx) {
        Ok(handler) => guard::run(handler).await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok(reply) => Some(reply),
        Err(err) => {
            tracing::warn!(
                extension = %entry.name,
                error = %err,
                source = ?std::error::Error::source(&err),
                "extension skipped"
            );
            None
        }
    }
}
