//! Contact messages repo, presents CRUD operations with db for messages sent from the contact form
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::authorization::*;
use models::contact_message::contact_messages::dsl::*;
use models::{matches_search, ContactMessage, ContactMessagesSearchTerms, NewContactMessage, UpdateContactMessage};
use repos::acl;
use repos::acl::base::CheckScope;
use repos::types::{RepoAcl, RepoResult};

/// Contact messages repository, responsible for handling contact_messages
pub struct ContactMessagesRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
    pub acl: Box<RepoAcl<ContactMessage>>,
}

pub trait ContactMessagesRepo {
    /// Returns messages, newest first
    fn list(&self, terms: ContactMessagesSearchTerms) -> RepoResult<Vec<ContactMessage>>;

    /// Find specific message by id
    fn find(&self, id_arg: i32) -> RepoResult<Option<ContactMessage>>;

    /// Stores new message
    fn create(&self, payload: NewContactMessage) -> RepoResult<ContactMessage>;

    /// Updates specific message
    fn update(&self, id_arg: i32, payload: UpdateContactMessage) -> RepoResult<ContactMessage>;

    /// Deletes specific message
    fn delete(&self, id_arg: i32) -> RepoResult<ContactMessage>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ContactMessagesRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T, acl: Box<RepoAcl<ContactMessage>>) -> Self {
        Self { db_conn, acl }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ContactMessagesRepo
    for ContactMessagesRepoImpl<'a, T>
{
    fn list(&self, terms: ContactMessagesSearchTerms) -> RepoResult<Vec<ContactMessage>> {
        debug!("List contact messages with terms {:?}.", terms);
        let mut query = contact_messages.order((created_at.desc(), id.desc())).into_boxed::<Pg>();
        if let Some(is_read_arg) = terms.is_read {
            query = query.filter(is_read.eq(is_read_arg));
        }

        acl::check(&*self.acl, Resource::ContactMessages, Action::Read, self, None)
            .and_then(|_| query.load::<ContactMessage>(self.db_conn).map_err(From::from))
            .map(|found| {
                found
                    .into_iter()
                    .filter(|msg| matches_search(terms.search.as_ref().map(String::as_str), &[&msg.name, &msg.email, &msg.subject]))
                    .collect()
            }).map_err(|e: FailureError| {
                e.context(format!("List contact messages with terms {:?} error occurred.", terms))
                    .into()
            })
    }

    fn find(&self, id_arg: i32) -> RepoResult<Option<ContactMessage>> {
        debug!("Find in contact messages with id {}.", id_arg);
        acl::check(&*self.acl, Resource::ContactMessages, Action::Read, self, None)
            .and_then(|_| {
                contact_messages
                    .filter(id.eq(id_arg))
                    .get_result::<ContactMessage>(self.db_conn)
                    .optional()
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Find in contact messages with id {} error occurred.", id_arg)).into())
    }

    fn create(&self, payload: NewContactMessage) -> RepoResult<ContactMessage> {
        debug!("Create contact message {:?}.", payload);
        acl::check(&*self.acl, Resource::ContactMessages, Action::Create, self, None)
            .and_then(|_| {
                diesel::insert_into(contact_messages)
                    .values(&payload)
                    .get_result::<ContactMessage>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Create contact message {:?} error occurred.", payload)).into())
    }

    fn update(&self, id_arg: i32, payload: UpdateContactMessage) -> RepoResult<ContactMessage> {
        debug!("Update contact message {} with {:?}.", id_arg, payload);
        acl::check(&*self.acl, Resource::ContactMessages, Action::Update, self, None)
            .and_then(|_| {
                diesel::update(contact_messages.filter(id.eq(id_arg)))
                    .set(&payload)
                    .get_result::<ContactMessage>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| {
                e.context(format!("Update contact message {} with {:?} error occurred.", id_arg, payload))
                    .into()
            })
    }

    fn delete(&self, id_arg: i32) -> RepoResult<ContactMessage> {
        debug!("Delete contact message with id {}.", id_arg);
        acl::check(&*self.acl, Resource::ContactMessages, Action::Delete, self, None)
            .and_then(|_| {
                diesel::delete(contact_messages.filter(id.eq(id_arg)))
                    .get_result::<ContactMessage>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Delete contact message with id {} error occurred.", id_arg)).into())
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CheckScope<Scope, ContactMessage>
    for ContactMessagesRepoImpl<'a, T>
{
    fn is_in_scope(&self, _user_id: i32, scope: &Scope, _obj: Option<&ContactMessage>) -> bool {
        match *scope {
            Scope::All => true,
            Scope::Owned => false,
        }
    }
}
