use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use skillgraph_core::AppResult;
use skillgraph_domain::{
    AuditAction, CallerIdentity, Permission, PermissionVerb, Resource, Ticket, TicketStatus,
};

use crate::{AuditEntry, AuditTrailService, AuthorizationService};

/// Repository port for support tickets.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Lists tickets, newest first.
    async fn list_tickets(&self) -> AppResult<Vec<Ticket>>;

    /// Stores a new ticket.
    async fn insert_ticket(&self, ticket: Ticket) -> AppResult<()>;

    /// Moves a ticket to another workflow state.
    async fn set_status(&self, id: &str, status: TicketStatus) -> AppResult<Ticket>;

    /// Removes a ticket. Returns `false` when it does not exist.
    async fn delete_ticket(&self, id: &str) -> AppResult<bool>;
}

/// Application service for support ticket administration.
#[derive(Clone)]
pub struct SupportService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn TicketRepository>,
    audit_trail: AuditTrailService,
}

const ENTITY: &str = "ticket";

impl SupportService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn TicketRepository>,
        audit_trail: AuditTrailService,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            audit_trail,
        }
    }

    /// Lists tickets.
    pub async fn list_tickets(&self, caller: &CallerIdentity) -> AppResult<Vec<Ticket>> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Tickets, PermissionVerb::Read),
        )?;

        self.repository.list_tickets().await
    }

    /// Files a ticket on behalf of a requester.
    pub async fn create_ticket(
        &self,
        caller: &CallerIdentity,
        subject: String,
        requester_email: String,
    ) -> AppResult<Ticket> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Tickets, PermissionVerb::Write),
        )?;

        let ticket = Ticket::new(
            format!("tk_{}", Uuid::new_v4().simple()),
            subject,
            requester_email,
            Utc::now().timestamp_millis(),
        )?;
        self.repository.insert_ticket(ticket.clone()).await?;

        self.audit_trail
            .record(AuditEntry {
                actor: caller.subject().to_owned(),
                action: AuditAction::TicketCreated,
                entity: ENTITY.to_owned(),
                entity_id: ticket.id().to_owned(),
                metadata: None,
            })
            .await;

        Ok(ticket)
    }

    /// Moves a ticket to another workflow state.
    pub async fn set_ticket_status(
        &self,
        caller: &CallerIdentity,
        id: &str,
        status: TicketStatus,
    ) -> AppResult<Ticket> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Tickets, PermissionVerb::Write),
        )?;

        let ticket = self.repository.set_status(id, status).await?;

        self.audit_trail
            .record(AuditEntry {
                actor: caller.subject().to_owned(),
                action: AuditAction::TicketUpdated,
                entity: ENTITY.to_owned(),
                entity_id: ticket.id().to_owned(),
                metadata: Some(serde_json::json!({ "status": status.as_str() })),
            })
            .await;

        Ok(ticket)
    }

    /// Deletes a ticket. Returns `false` when it does not exist; nothing is
    /// audited in that case.
    pub async fn delete_ticket(&self, caller: &CallerIdentity, id: &str) -> AppResult<bool> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Tickets, PermissionVerb::Delete),
        )?;

        let removed = self.repository.delete_ticket(id).await?;
        if removed {
            self.audit_trail
                .record(AuditEntry {
                    actor: caller.subject().to_owned(),
                    action: AuditAction::TicketDeleted,
                    entity: ENTITY.to_owned(),
                    entity_id: id.to_owned(),
                    metadata: None,
                })
                .await;
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use skillgraph_core::{AppError, AppResult};
    use skillgraph_domain::{CallerIdentity, Role, Ticket, TicketStatus};

    use crate::{AuditTrailService, AuthorizationService, RoleGrants};

    use super::{SupportService, TicketRepository};

    #[derive(Default)]
    struct FakeTicketRepository {
        tickets: Mutex<Vec<Ticket>>,
    }

    #[async_trait]
    impl TicketRepository for FakeTicketRepository {
        async fn list_tickets(&self) -> AppResult<Vec<Ticket>> {
            Ok(self.tickets.lock().await.clone())
        }

        async fn insert_ticket(&self, ticket: Ticket) -> AppResult<()> {
            self.tickets.lock().await.push(ticket);
            Ok(())
        }

        async fn set_status(&self, id: &str, status: TicketStatus) -> AppResult<Ticket> {
            let mut tickets = self.tickets.lock().await;
            let ticket = tickets
                .iter_mut()
                .find(|ticket| ticket.id() == id)
                .ok_or_else(|| AppError::NotFound(format!("ticket '{id}' does not exist")))?;
            ticket.set_status(status);
            Ok(ticket.clone())
        }

        async fn delete_ticket(&self, id: &str) -> AppResult<bool> {
            let mut tickets = self.tickets.lock().await;
            let before = tickets.len();
            tickets.retain(|ticket| ticket.id() != id);
            Ok(tickets.len() < before)
        }
    }

    fn service() -> (SupportService, AuditTrailService) {
        let audit_trail = AuditTrailService::new(None, None);
        let service = SupportService::new(
            AuthorizationService::new(RoleGrants::builtin()),
            Arc::new(FakeTicketRepository::default()),
            audit_trail.clone(),
        );
        (service, audit_trail)
    }

    #[tokio::test]
    async fn support_can_work_tickets_but_not_delete_them() {
        let (service, audit_trail) = service();
        let support = CallerIdentity::new("support", Some(Role::Support));

        let ticket = service
            .create_ticket(
                &support,
                "Unable to upload resume".to_owned(),
                "ava@example.com".to_owned(),
            )
            .await;
        assert!(ticket.is_ok());
        let ticket = ticket.unwrap_or_else(|_| unreachable!());

        let resolved = service
            .set_ticket_status(&support, ticket.id(), TicketStatus::Resolved)
            .await;
        assert!(resolved.is_ok());

        let deleted = service.delete_ticket(&support, ticket.id()).await;
        assert!(matches!(deleted, Err(AppError::Forbidden(_))));

        let page = audit_trail.list(1, 50).await;
        assert_eq!(page.total, 2);
        assert_eq!(page.records[0].action, "support.update");
    }

    #[tokio::test]
    async fn reader_is_denied_ticket_mutation() {
        let (service, audit_trail) = service();
        let reader = CallerIdentity::new("reader", Some(Role::Reader));

        let result = service
            .create_ticket(
                &reader,
                "Login issue".to_owned(),
                "noah@example.com".to_owned(),
            )
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(audit_trail.list(1, 50).await.total, 0);
    }
}
