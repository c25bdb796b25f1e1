//! Startup decision: join the cluster, fall back to master, or give up.

use anyhow::{Context, Result};
use muster_common::{NodeIdentity, NodeRole};

use super::client::{JoinClient, JoinError, joined};
use super::listener::{ListenerConfig, MembershipListener};

/// Role after a join attempt, or `None` when the node should exit.
pub fn decide(joined: bool, make_master_on_error: bool) -> Option<NodeRole> {
    match (joined, make_master_on_error) {
        (true, _) => Some(NodeRole::Member),
        (false, true) => Some(NodeRole::Master),
        (false, false) => None,
    }
}

/// Runs the join attempt and starts the listener when a role was taken.
pub struct FallbackCoordinator {
    client: JoinClient,
    listener: ListenerConfig,
    make_master_on_error: bool,
}

impl FallbackCoordinator {
    pub fn new(client: JoinClient, listener: ListenerConfig, make_master_on_error: bool) -> Self {
        Self {
            client,
            listener,
            make_master_on_error,
        }
    }

    /// Attempt the join and decide the role.
    ///
    /// Only an id collision is an error: the cluster is alive, so taking
    /// mastership would be wrong.
    pub async fn resolve(
        &self,
        me: &NodeIdentity,
        target: &NodeIdentity,
    ) -> Result<Option<NodeRole>, JoinError> {
        let accepted = match self.client.try_join(me, target).await {
            Err(e @ JoinError::IdCollision(_)) => return Err(e),
            result => joined(me, &result),
        };

        Ok(decide(accepted, self.make_master_on_error))
    }

    /// Join or fall back, then serve joiners for the rest of the process.
    ///
    /// Returns `Ok(())` only when the node gave up without a role.
    pub async fn bootstrap(self, me: NodeIdentity, target: NodeIdentity) -> Result<()> {
        let role = self
            .resolve(&me, &target)
            .await
            .context("Join handshake rejected")?;

        let Some(role) = role else {
            tracing::info!(
                node_id = me.id,
                "Exiting; start with --make-master-on-error to run this node as master"
            );
            return Ok(());
        };

        match role {
            NodeRole::Member => tracing::info!(node_id = me.id, %role, "✅ Joined cluster"),
            NodeRole::Master => tracing::info!(
                node_id = me.id,
                %role,
                "👑 No cluster reachable, starting this node as master"
            ),
        }

        MembershipListener::new(me, self.listener)
            .serve()
            .await
            .context("Membership listener failed")?;

        Ok(())
    }
}
