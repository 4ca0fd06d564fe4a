use async_trait::async_trait;
use tokio::sync::RwLock;

use skillgraph_application::TicketRepository;
use skillgraph_core::{AppError, AppResult};
use skillgraph_domain::{Ticket, TicketStatus};

/// In-memory support ticket store; newest entries list first.
#[derive(Debug, Default)]
pub struct InMemorySupportRepository {
    tickets: RwLock<Vec<Ticket>>,
}

impl InMemorySupportRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tickets: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TicketRepository for InMemorySupportRepository {
    async fn list_tickets(&self) -> AppResult<Vec<Ticket>> {
        Ok(self.tickets.read().await.clone())
    }

    async fn insert_ticket(&self, ticket: Ticket) -> AppResult<()> {
        let mut tickets = self.tickets.write().await;

        if tickets.iter().any(|stored| stored.id() == ticket.id()) {
            return Err(AppError::Conflict(format!(
                "ticket '{}' already exists",
                ticket.id()
            )));
        }

        tickets.insert(0, ticket);
        Ok(())
    }

    async fn set_status(&self, id: &str, status: TicketStatus) -> AppResult<Ticket> {
        let mut tickets = self.tickets.write().await;
        let ticket = tickets
            .iter_mut()
            .find(|ticket| ticket.id() == id)
            .ok_or_else(|| AppError::NotFound(format!("ticket '{id}' does not exist")))?;
        ticket.set_status(status);
        Ok(ticket.clone())
    }

    async fn delete_ticket(&self, id: &str) -> AppResult<bool> {
        let mut tickets = self.tickets.write().await;
        let before = tickets.len();
        tickets.retain(|ticket| ticket.id() != id);
        Ok(tickets.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use skillgraph_application::TicketRepository;
    use skillgraph_domain::{Ticket, TicketStatus};

    use super::InMemorySupportRepository;

    #[tokio::test]
    async fn status_transitions_are_persisted() {
        let repository = InMemorySupportRepository::new();
        let ticket = Ticket::new("tk1", "Unable to upload resume", "ava@example.com", 1_000)
            .unwrap_or_else(|_| unreachable!());
        let inserted = repository.insert_ticket(ticket).await;
        assert!(inserted.is_ok());

        let resolved = repository.set_status("tk1", TicketStatus::Resolved).await;
        assert!(resolved.is_ok());

        let tickets = repository.list_tickets().await.unwrap_or_default();
        assert_eq!(tickets[0].status(), TicketStatus::Resolved);
    }
}
