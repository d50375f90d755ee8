//! Bookings repo, presents CRUD operations with db for bookings
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::authorization::*;
use models::booking::bookings::dsl::*;
use models::{matches_search, Booking, BookingsSearchTerms, InsertBooking, UpdateBooking};
use repos::acl;
use repos::acl::base::CheckScope;
use repos::types::{RepoAcl, RepoResult};

/// Bookings repository, responsible for handling bookings
pub struct BookingsRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
    pub acl: Box<RepoAcl<Booking>>,
}

pub trait BookingsRepo {
    /// Returns bookings, newest first
    fn list(&self, terms: BookingsSearchTerms) -> RepoResult<Vec<Booking>>;

    /// Find specific booking by id
    fn find(&self, id_arg: i32) -> RepoResult<Option<Booking>>;

    /// Creates new booking
    fn create(&self, payload: InsertBooking) -> RepoResult<Booking>;

    /// Updates specific booking
    fn update(&self, id_arg: i32, payload: UpdateBooking) -> RepoResult<Booking>;

    /// Deletes specific booking
    fn delete(&self, id_arg: i32) -> RepoResult<Booking>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> BookingsRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T, acl: Box<RepoAcl<Booking>>) -> Self {
        Self { db_conn, acl }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> BookingsRepo for BookingsRepoImpl<'a, T> {
    fn list(&self, terms: BookingsSearchTerms) -> RepoResult<Vec<Booking>> {
        debug!("List bookings with terms {:?}.", terms);
        let mut query = bookings.order((created_at.desc(), id.desc())).into_boxed::<Pg>();
        if let Some(status_arg) = terms.status {
            query = query.filter(status.eq(status_arg));
        }

        acl::check(&*self.acl, Resource::Bookings, Action::Read, self, None)
            .and_then(|_| query.load::<Booking>(self.db_conn).map_err(From::from))
            .map(|found| {
                found
                    .into_iter()
                    .filter(|booking| {
                        matches_search(
                            terms.search.as_ref().map(String::as_str),
                            &[&booking.customer_name, &booking.customer_email],
                        )
                    }).collect()
            }).map_err(|e: FailureError| e.context(format!("List bookings with terms {:?} error occurred.", terms)).into())
    }

    fn find(&self, id_arg: i32) -> RepoResult<Option<Booking>> {
        debug!("Find in bookings with id {}.", id_arg);
        acl::check(&*self.acl, Resource::Bookings, Action::Read, self, None)
            .and_then(|_| {
                bookings
                    .filter(id.eq(id_arg))
                    .get_result::<Booking>(self.db_conn)
                    .optional()
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Find in bookings with id {} error occurred.", id_arg)).into())
    }

    fn create(&self, payload: InsertBooking) -> RepoResult<Booking> {
        debug!("Create booking {:?}.", payload);
        acl::check(&*self.acl, Resource::Bookings, Action::Create, self, None)
            .and_then(|_| {
                diesel::insert_into(bookings)
                    .values(&payload)
                    .get_result::<Booking>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Create booking {:?} error occurred.", payload)).into())
    }

    fn update(&self, id_arg: i32, payload: UpdateBooking) -> RepoResult<Booking> {
        debug!("Update booking {} with {:?}.", id_arg, payload);
        acl::check(&*self.acl, Resource::Bookings, Action::Update, self, None)
            .and_then(|_| {
                diesel::update(bookings.filter(id.eq(id_arg)))
                    .set(&payload)
                    .get_result::<Booking>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Update booking {} with {:?} error occurred.", id_arg, payload)).into())
    }

    fn delete(&self, id_arg: i32) -> RepoResult<Booking> {
        debug!("Delete booking with id {}.", id_arg);
        acl::check(&*self.acl, Resource::Bookings, Action::Delete, self, None)
            .and_then(|_| {
                diesel::delete(bookings.filter(id.eq(id_arg)))
                    .get_result::<Booking>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Delete booking with id {} error occurred.", id_arg)).into())
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CheckScope<Scope, Booking>
    for BookingsRepoImpl<'a, T>
{
    fn is_in_scope(&self, _user_id: i32, scope: &Scope, _obj: Option<&Booking>) -> bool {
        match *scope {
            Scope::All => true,
            Scope::Owned => false,
        }
    }
}
