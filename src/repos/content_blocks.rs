//! Content blocks repo, presents CRUD operations with db for page texts
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::authorization::*;
use models::content_block::contents::dsl::*;
use models::{matches_search, ContentBlock, ContentBlocksSearchTerms, NewContentBlock, ReplaceContentBlock, UpdateContentBlock};
use repos::acl;
use repos::acl::base::CheckScope;
use repos::types::{RepoAcl, RepoResult};

/// Content blocks repository, responsible for handling contents
pub struct ContentBlocksRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
    pub acl: Box<RepoAcl<ContentBlock>>,
}

pub trait ContentBlocksRepo {
    /// Returns content blocks ordered by page and display order
    fn list(&self, terms: ContentBlocksSearchTerms) -> RepoResult<Vec<ContentBlock>>;

    /// Find specific content block by id
    fn find(&self, id_arg: i32) -> RepoResult<Option<ContentBlock>>;

    /// Checks if `(page, block_key)` is taken by any block except `exclude_id`
    fn key_exists(&self, page_arg: String, block_key_arg: String, exclude_id: Option<i32>) -> RepoResult<bool>;

    /// Creates new content block
    fn create(&self, payload: NewContentBlock) -> RepoResult<ContentBlock>;

    /// Replaces all mutable fields of specific content block
    fn replace(&self, id_arg: i32, payload: ReplaceContentBlock) -> RepoResult<ContentBlock>;

    /// Updates specific content block
    fn update(&self, id_arg: i32, payload: UpdateContentBlock) -> RepoResult<ContentBlock>;

    /// Deletes specific content block
    fn delete(&self, id_arg: i32) -> RepoResult<ContentBlock>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ContentBlocksRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T, acl: Box<RepoAcl<ContentBlock>>) -> Self {
        Self { db_conn, acl }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ContentBlocksRepo
    for ContentBlocksRepoImpl<'a, T>
{
    fn list(&self, terms: ContentBlocksSearchTerms) -> RepoResult<Vec<ContentBlock>> {
        debug!("List content blocks with terms {:?}.", terms);
        let mut query = contents.order((page.asc(), display_order.asc(), id.asc())).into_boxed::<Pg>();
        if let Some(ref page_arg) = terms.page {
            query = query.filter(page.eq(page_arg.clone()));
        }
        if let Some(is_active_arg) = terms.is_active {
            query = query.filter(is_active.eq(is_active_arg));
        }

        acl::check(&*self.acl, Resource::ContentBlocks, Action::Read, self, None)
            .and_then(|_| query.load::<ContentBlock>(self.db_conn).map_err(From::from))
            .map(|found| {
                found
                    .into_iter()
                    .filter(|block| {
                        matches_search(
                            terms.search.as_ref().map(String::as_str),
                            &[
                                &block.block_key,
                                block.title_de.as_ref().map(String::as_str).unwrap_or_default(),
                                block.title_en.as_ref().map(String::as_str).unwrap_or_default(),
                                &block.body_de,
                                &block.body_en,
                            ],
                        )
                    }).collect()
            }).map_err(|e: FailureError| {
                e.context(format!("List content blocks with terms {:?} error occurred.", terms))
                    .into()
            })
    }

    fn find(&self, id_arg: i32) -> RepoResult<Option<ContentBlock>> {
        debug!("Find in content blocks with id {}.", id_arg);
        acl::check(&*self.acl, Resource::ContentBlocks, Action::Read, self, None)
            .and_then(|_| {
                contents
                    .filter(id.eq(id_arg))
                    .get_result::<ContentBlock>(self.db_conn)
                    .optional()
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Find in content blocks with id {} error occurred.", id_arg)).into())
    }

    fn key_exists(&self, page_arg: String, block_key_arg: String, exclude_id: Option<i32>) -> RepoResult<bool> {
        debug!("Check if content block {}/{} exists.", page_arg, block_key_arg);
        acl::check(&*self.acl, Resource::ContentBlocks, Action::Read, self, None)
            .and_then(|_| {
                contents
                    .filter(page.eq(&page_arg))
                    .filter(block_key.eq(&block_key_arg))
                    .select(id)
                    .load::<i32>(self.db_conn)
                    .map_err(From::from)
            }).map(|ids| ids.into_iter().any(|found| Some(found) != exclude_id))
            .map_err(|e: FailureError| {
                e.context(format!("Check if content block {}/{} exists error occurred.", page_arg, block_key_arg))
                    .into()
            })
    }

    fn create(&self, payload: NewContentBlock) -> RepoResult<ContentBlock> {
        debug!("Create content block {:?}.", payload);
        acl::check(&*self.acl, Resource::ContentBlocks, Action::Create, self, None)
            .and_then(|_| {
                diesel::insert_into(contents)
                    .values(&payload)
                    .get_result::<ContentBlock>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Create content block {:?} error occurred.", payload)).into())
    }

    fn replace(&self, id_arg: i32, payload: ReplaceContentBlock) -> RepoResult<ContentBlock> {
        debug!("Replace content block {} with {:?}.", id_arg, payload);
        acl::check(&*self.acl, Resource::ContentBlocks, Action::Update, self, None)
            .and_then(|_| {
                diesel::update(contents.filter(id.eq(id_arg)))
                    .set(&payload)
                    .get_result::<ContentBlock>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| {
                e.context(format!("Replace content block {} with {:?} error occurred.", id_arg, payload))
                    .into()
            })
    }

    fn update(&self, id_arg: i32, payload: UpdateContentBlock) -> RepoResult<ContentBlock> {
        debug!("Update content block {} with {:?}.", id_arg, payload);
        acl::check(&*self.acl, Resource::ContentBlocks, Action::Update, self, None)
            .and_then(|_| {
                diesel::update(contents.filter(id.eq(id_arg)))
                    .set(&payload)
                    .get_result::<ContentBlock>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| {
                e.context(format!("Update content block {} with {:?} error occurred.", id_arg, payload))
                    .into()
            })
    }

    fn delete(&self, id_arg: i32) -> RepoResult<ContentBlock> {
        debug!("Delete content block with id {}.", id_arg);
        acl::check(&*self.acl, Resource::ContentBlocks, Action::Delete, self, None)
            .and_then(|_| {
                diesel::delete(contents.filter(id.eq(id_arg)))
                    .get_result::<ContentBlock>(self.db_conn)
                    .map_err(From::from)
            }).map_err(|e: FailureError| e.context(format!("Delete content block with id {} error occurred.", id_arg)).into())
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CheckScope<Scope, ContentBlock>
    for ContentBlocksRepoImpl<'a, T>
{
    fn is_in_scope(&self, _user_id: i32, scope: &Scope, _obj: Option<&ContentBlock>) -> bool {
        match *scope {
            Scope::All => true,
            Scope::Owned => false,
        }
    }
}
