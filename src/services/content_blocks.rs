//! Content Services, texts of the static pages
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;

use super::types::ServiceFuture;
use models::*;
use repos::ReposFactory;
use services::{conflict_error, not_found_error, validate_payload, Service};

pub trait ContentBlocksService {
    /// Returns content blocks ordered by page and display order
    fn list_content_blocks(&self, terms: ContentBlocksSearchTerms) -> ServiceFuture<Vec<ContentBlock>>;
    fn get_content_block(&self, content_block_id: i32) -> ServiceFuture<ContentBlock>;
    /// Creates a block, `(page, block_key)` must be free
    fn create_content_block(&self, payload: NewContentBlock) -> ServiceFuture<ContentBlock>;
    fn replace_content_block(&self, content_block_id: i32, payload: ReplaceContentBlock) -> ServiceFuture<ContentBlock>;
    fn update_content_block(&self, content_block_id: i32, payload: UpdateContentBlock) -> ServiceFuture<ContentBlock>;
    fn delete_content_block(&self, content_block_id: i32) -> ServiceFuture<ContentBlock>;
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > ContentBlocksService for Service<T, M, F>
{
    fn list_content_blocks(&self, terms: ContentBlocksSearchTerms) -> ServiceFuture<Vec<ContentBlock>> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let contents_repo = repo_factory.create_content_blocks_repo(&*conn, user_id);
            contents_repo
                .list(terms)
                .map_err(|e| e.context("Service ContentBlocks, list_content_blocks endpoint error occurred.").into())
        })
    }

    fn get_content_block(&self, content_block_id: i32) -> ServiceFuture<ContentBlock> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let contents_repo = repo_factory.create_content_blocks_repo(&*conn, user_id);
            contents_repo
                .find(content_block_id)
                .and_then(|block| block.ok_or_else(|| not_found_error("Content block", content_block_id)))
                .map_err(|e| e.context("Service ContentBlocks, get_content_block endpoint error occurred.").into())
        })
    }

    fn create_content_block(&self, payload: NewContentBlock) -> ServiceFuture<ContentBlock> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let contents_repo = repo_factory.create_content_blocks_repo(&*conn, user_id);
            validate_payload(&payload)
                .and_then(|_| contents_repo.key_exists(payload.page.clone(), payload.block_key.clone(), None))
                .and_then(|exists| {
                    if exists {
                        Err(conflict_error("Content block key already exists on this page"))
                    } else {
                        contents_repo.create(payload)
                    }
                }).map_err(|e: FailureError| e.context("Service ContentBlocks, create_content_block endpoint error occurred.").into())
        })
    }

    fn replace_content_block(&self, content_block_id: i32, payload: ReplaceContentBlock) -> ServiceFuture<ContentBlock> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let contents_repo = repo_factory.create_content_blocks_repo(&*conn, user_id);
            validate_payload(&payload)
                .and_then(|_| contents_repo.find(content_block_id))
                .and_then(|block| block.ok_or_else(|| not_found_error("Content block", content_block_id)))
                .and_then(|_| contents_repo.key_exists(payload.page.clone(), payload.block_key.clone(), Some(content_block_id)))
                .and_then(|exists| {
                    if exists {
                        Err(conflict_error("Content block key already exists on this page"))
                    } else {
                        contents_repo.replace(content_block_id, payload)
                    }
                }).map_err(|e: FailureError| e.context("Service ContentBlocks, replace_content_block endpoint error occurred.").into())
        })
    }

    fn update_content_block(&self, content_block_id: i32, payload: UpdateContentBlock) -> ServiceFuture<ContentBlock> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let contents_repo = repo_factory.create_content_blocks_repo(&*conn, user_id);
            validate_payload(&payload)
                .and_then(|_| contents_repo.find(content_block_id))
                .and_then(|block| block.ok_or_else(|| not_found_error("Content block", content_block_id)))
                .and_then(|block| {
                    if payload.is_empty() {
                        return Ok(block);
                    }
                    if payload.page.is_some() || payload.block_key.is_some() {
                        let page = payload.page.clone().unwrap_or_else(|| block.page.clone());
                        let block_key = payload.block_key.clone().unwrap_or_else(|| block.block_key.clone());
                        if contents_repo.key_exists(page, block_key, Some(content_block_id))? {
                            return Err(conflict_error("Content block key already exists on this page"));
                        }
                    }
                    contents_repo.update(content_block_id, payload)
                }).map_err(|e: FailureError| e.context("Service ContentBlocks, update_content_block endpoint error occurred.").into())
        })
    }

    fn delete_content_block(&self, content_block_id: i32) -> ServiceFuture<ContentBlock> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let contents_repo = repo_factory.create_content_blocks_repo(&*conn, user_id);
            contents_repo
                .find(content_block_id)
                .and_then(|block| block.ok_or_else(|| not_found_error("Content block", content_block_id)))
                .and_then(|_| contents_repo.delete(content_block_id))
                .map_err(|e: FailureError| e.context("Service ContentBlocks, delete_content_block endpoint error occurred.").into())
        })
    }
}

#[cfg(test)]
pub mod tests {
    use tokio_core::reactor::Core;

    use errors::Error;
    use http::errors::find_in_chain;
    use models::*;
    use repos::repo_factory::tests::*;
    use services::*;

    fn create_new_content_block(page: &str, block_key: &str) -> NewContentBlock {
        NewContentBlock {
            page: page.to_string(),
            block_key: block_key.to_string(),
            title_de: None,
            title_en: None,
            body_de: "Kostenloser Kostenvoranschlag.".to_string(),
            body_en: "Free quote.".to_string(),
            display_order: 2,
            is_active: true,
        }
    }

    #[test]
    fn test_list_content_blocks_of_page() {
        let mut core = Core::new().unwrap();
        let service = create_service(None);
        let terms = ContentBlocksSearchTerms {
            page: Some("about".to_string()),
            is_active: Some(true),
            ..Default::default()
        };
        let blocks = core.run(service.list_content_blocks(terms)).unwrap();
        assert_eq!(blocks.iter().map(|block| block.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_create_content_block() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_USER_ID));
        let block = core.run(service.create_content_block(create_new_content_block("home", "offer"))).unwrap();
        assert_eq!(block.block_key, "offer");
    }

    #[test]
    fn test_create_content_block_with_taken_key() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_USER_ID));
        let result = core.run(service.create_content_block(create_new_content_block("about", "team"))).unwrap_err();
        assert!(match find_in_chain::<Error>(&result) {
            Some(Error::Conflict(_)) => true,
            _ => false,
        });
    }

    #[test]
    fn test_move_block_onto_taken_key() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_USER_ID));
        let payload = UpdateContentBlock {
            block_key: Some("intro".to_string()),
            ..Default::default()
        };
        let result = core.run(service.update_content_block(2, payload)).unwrap_err();
        assert!(match find_in_chain::<Error>(&result) {
            Some(Error::Conflict(_)) => true,
            _ => false,
        });
    }

    #[test]
    fn test_deactivate_content_block() {
        let mut core = Core::new().unwrap();
        let service = create_service(Some(MOCK_USER_ID));
        let payload = UpdateContentBlock {
            is_active: Some(false),
            ..Default::default()
        };
        let block = core.run(service.update_content_block(3, payload)).unwrap();
        assert!(!block.is_active);
        assert_eq!(block.page, "home");
    }
}
