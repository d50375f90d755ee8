//! Contact form submissions and their inbox in the back-office
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;

use super::types::ServiceFuture;
use models::*;
use repos::ReposFactory;
use services::{not_found_error, validate_payload, Service};

pub trait ContactMessagesService {
    /// Stores a message sent through the public contact form
    fn send_contact_message(&self, payload: NewContactMessage) -> ServiceFuture<ContactMessage>;
    /// Returns messages, newest first
    fn list_contact_messages(&self, terms: ContactMessagesSearchTerms) -> ServiceFuture<Vec<ContactMessage>>;
    fn get_contact_message(&self, contact_message_id: i32) -> ServiceFuture<ContactMessage>;
    /// Marks a message read or unread
    fn update_contact_message(&self, contact_message_id: i32, payload: UpdateContactMessage) -> ServiceFuture<ContactMessage>;
    fn delete_contact_message(&self, contact_message_id: i32) -> ServiceFuture<ContactMessage>;
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > ContactMessagesService for Service<T, M, F>
{
    fn send_contact_message(&self, payload: NewContactMessage) -> ServiceFuture<ContactMessage> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let messages_repo = repo_factory.create_contact_messages_repo(&*conn, user_id);
            validate_payload(&payload)
                .and_then(|_| messages_repo.create(payload))
                .map_err(|e: FailureError| e.context("Service ContactMessages, send_contact_message endpoint error occurred.").into())
        })
    }

    fn list_contact_messages(&self, terms: ContactMessagesSearchTerms) -> ServiceFuture<Vec<ContactMessage>> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let messages_repo = repo_factory.create_contact_messages_repo(&*conn, user_id);
            messages_repo
                .list(terms)
                .map_err(|e| e.context("Service ContactMessages, list_contact_messages endpoint error occurred.").into())
        })
    }

    fn get_contact_message(&self, contact_message_id: i32) -> ServiceFuture<ContactMessage> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let messages_repo = repo_factory.create_contact_messages_repo(&*conn, user_id);
            messages_repo
                .find(contact_message_id)
                .and_then(|msg| msg.ok_or_else(|| not_found_error("Contact message", contact_message_id)))
                .map_err(|e| e.context("Service ContactMessages, get_contact_message endpoint error occurred.").into())
        })
    }

    fn update_contact_message(&self, contact_message_id: i32, payload: UpdateContactMessage) -> ServiceFuture<ContactMessage> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let messages_repo = repo_factory.create_contact_messages_repo(&*conn, user_id);
            messages_repo
                .find(contact_message_id)
                .and_then(|msg| msg.ok_or_else(|| not_found_error("Contact message", contact_message_id)))
                .and_then(|msg| {
                    if payload.is_empty() {
                        Ok(msg)
                    } else {
                        messages_repo.update(contact_message_id, payload)
                    }
                }).map_err(|e: FailureError| e.context("Service ContactMessages, update_contact_message endpoint error occurred.").into())
        })
    }

    fn delete_contact_message(&self, contact_message_id: i32) -> ServiceFuture<ContactMessage> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let messages_repo = repo_factory.create_contact_messages_repo(&*conn, user_id);
            messages_repo
                .find(contact_message_id)
                .and_then(|msg| msg.ok_or_else(|| not_found_error("Contact message", contact_message_id)))
                .and_then(|_| messages_repo.delete(contact_message_id))
                .map_err(|e: FailureError| e.context("Service ContactMessages, delete_contact_message endpoint error occurred.").into())
        })
    }
}
