//! Image board accessors.

use std::sync::Arc;

use tracing::instrument;

use super::{many, one, RequestContext};
use crate::adapters::cache::GetOptions;
use crate::domain::errors::{CacheResult, LazyError};
use crate::domain::models::{ImageBoard, ImagePost};
use crate::domain::ports::Querier;

impl<Q: Querier> RequestContext<Q> {
    pub async fn image_boards(&self) -> CacheResult<Arc<Vec<ImageBoard>>> {
        let querier = &self.querier;
        self.registry("image_boards")?
            .image_boards
            .load(|| async move { many(querier.image_boards().await) })
            .await
            .map_err(LazyError::Fetch)
    }

    /// Boards nested under `parent_id`.
    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn sub_image_boards(
        &self,
        parent_id: i32,
        opts: GetOptions<i32, Arc<Vec<ImageBoard>>>,
    ) -> CacheResult<Arc<Vec<ImageBoard>>> {
        let querier = &self.querier;
        self.registry("sub_image_boards")?
            .sub_image_boards
            .get(parent_id, |id| async move { many(querier.sub_image_boards(id).await) }, opts)
            .await
    }

    /// Approved posts on one board.
    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn image_board_posts(
        &self,
        board_id: i32,
        opts: GetOptions<i32, Arc<Vec<ImagePost>>>,
    ) -> CacheResult<Arc<Vec<ImagePost>>> {
        let (querier, viewer) = (&self.querier, self.user_id);
        self.registry("image_board_posts")?
            .image_board_posts
            .get(
                board_id,
                |id| async move { many(querier.image_posts_by_board(viewer, id).await) },
                opts,
            )
            .await
    }

    /// Posts of the selected board, empty when none is selected.
    pub async fn current_board_posts(
        &self,
        opts: GetOptions<i32, Arc<Vec<ImagePost>>>,
    ) -> CacheResult<Arc<Vec<ImagePost>>> {
        match self.selection.board_id {
            Some(id) => self.image_board_posts(id, opts).await,
            None => Ok(Arc::default()),
        }
    }

    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn image_post_by_id(
        &self,
        id: i32,
        opts: GetOptions<i32, Option<Arc<ImagePost>>>,
    ) -> CacheResult<Option<Arc<ImagePost>>> {
        let (querier, viewer) = (&self.querier, self.user_id);
        self.registry("image_post_rows")?
            .image_post_rows
            .get(id, |id| async move { one(querier.image_post_by_id(viewer, id).await) }, opts)
            .await
    }

    pub async fn current_image_post(
        &self,
        opts: GetOptions<i32, Option<Arc<ImagePost>>>,
    ) -> CacheResult<Option<Arc<ImagePost>>> {
        match self.selection.image_post_id {
            Some(id) => self.image_post_by_id(id, opts).await,
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryQuerier;
    use crate::application::request_context::Selection;
    use crate::domain::models::Config;
    use chrono::Utc;

    fn board(id: i32, parent_id: Option<i32>) -> ImageBoard {
        ImageBoard {
            id,
            parent_id,
            title: format!("board {id}"),
            description: String::new(),
            approval_required: false,
        }
    }

    fn image(id: i32, board_id: i32, approved: bool) -> ImagePost {
        ImagePost {
            id,
            board_id,
            user_id: 1,
            username: "alice".into(),
            description: String::new(),
            thumbnail: format!("/thumb/{id}.jpg"),
            full_image: format!("/img/{id}.jpg"),
            approved,
            posted: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_board_tree_and_posts() {
        let querier = Arc::new(InMemoryQuerier::new());
        querier
            .update(|t| {
                t.image_boards = vec![board(1, None), board(2, Some(1)), board(3, Some(1))];
                t.image_posts = vec![image(1, 2, true), image(2, 2, false), image(3, 3, true)];
            })
            .await;
        let ctx = RequestContext::new(Arc::clone(&querier), Arc::new(Config::default()), 0)
            .with_selection(Selection::from_params([("board", "2"), ("post", "3")]));

        assert_eq!(ctx.image_boards().await.unwrap().len(), 3);
        assert_eq!(ctx.sub_image_boards(1, GetOptions::new()).await.unwrap().len(), 2);
        assert_eq!(ctx.current_board_posts(GetOptions::new()).await.unwrap().len(), 1);
        assert_eq!(
            ctx.current_image_post(GetOptions::new()).await.unwrap().map(|p| p.board_id),
            Some(3)
        );
    }

    #[tokio::test]
    async fn test_no_board_selected() {
        let querier = Arc::new(InMemoryQuerier::new());
        let ctx = RequestContext::new(Arc::clone(&querier), Arc::new(Config::default()), 0);

        assert!(ctx.current_board_posts(GetOptions::new()).await.unwrap().is_empty());
        assert_eq!(querier.total_calls(), 0);
    }
}
