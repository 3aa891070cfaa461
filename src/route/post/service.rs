use std::sync::Arc;

use super::{
	model::{CreatePostInput, Post},
	repository::PostRepository,
	Error,
};

/// Business logic for posts.
#[derive(Clone)]
pub struct PostService {
	repository: Arc<dyn PostRepository>,
}

impl PostService {
	pub fn new(repository: Arc<dyn PostRepository>) -> Self {
		Self { repository }
	}

	pub async fn create_post(&self, input: &CreatePostInput) -> Result<Post, Error> {
		let post = self.repository.save_post(input).await?;

		tracing::info!(post.id = post.id, "created post");
		Ok(post)
	}

	pub async fn list_posts(&self) -> Result<Vec<Post>, Error> {
		Ok(self.repository.find_all_posts().await?)
	}

	/// Deletes a post, failing with [`Error::UnknownPost`] if it does not exist.
	///
	/// The existence check and the delete are separate statements, so two
	/// concurrent deletes of the same post may both pass the check.
	pub async fn delete_post(&self, id: i32) -> Result<(), Error> {
		if !self.repository.post_exists(id).await? {
			return Err(Error::UnknownPost(id));
		}

		self.repository.delete_post(id).await?;

		tracing::info!(post.id = id, "deleted post");
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use std::sync::Arc;

	use super::{CreatePostInput, Error, PostService};
	use crate::test::MemoryPostRepository;

	fn service() -> PostService {
		PostService::new(Arc::new(MemoryPostRepository::default()))
	}

	fn input(name: &str) -> CreatePostInput {
		CreatePostInput {
			name: name.into(),
			description: None,
		}
	}

	#[tokio::test]
	async fn test_create_assigns_ids() {
		let service = service();

		let first = service.create_post(&input("A")).await.unwrap();
		let second = service.create_post(&input("B")).await.unwrap();

		assert_eq!(first.id, 1);
		assert_eq!(second.id, 2);
		assert_eq!(first.name, "A");
	}

	#[tokio::test]
	async fn test_list_starts_empty() {
		assert!(service().list_posts().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_delete_unknown_post() {
		let service = service();
		let post = service.create_post(&input("A")).await.unwrap();

		let error = service.delete_post(post.id + 1).await.unwrap_err();

		assert!(matches!(error, Error::UnknownPost(id) if id == post.id + 1));
		assert_eq!(service.list_posts().await.unwrap(), vec![post]);
	}

	#[tokio::test]
	async fn test_delete_removes_post() {
		let service = service();
		let first = service.create_post(&input("A")).await.unwrap();
		let second = service.create_post(&input("B")).await.unwrap();

		service.delete_post(first.id).await.unwrap();

		assert_eq!(service.list_posts().await.unwrap(), vec![second]);
		assert!(matches!(
			service.delete_post(first.id).await,
			Err(Error::UnknownPost(..))
		));
	}
}
