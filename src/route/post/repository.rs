use crate::Database;

use super::model::{CreatePostInput, Post};

/// Storage for posts.
///
/// Implemented for the connection pool; tests swap in an in-memory store.
#[axum::async_trait]
pub trait PostRepository: Send + Sync {
	/// Inserts a post, returning it with its generated id.
	async fn save_post(&self, post: &CreatePostInput) -> Result<Post, sqlx::Error>;

	/// Deletes a post. Deleting an unknown id is not an error.
	async fn delete_post(&self, id: i32) -> Result<(), sqlx::Error>;

	/// Returns every post, oldest first.
	async fn find_all_posts(&self) -> Result<Vec<Post>, sqlx::Error>;

	async fn post_exists(&self, id: i32) -> Result<bool, sqlx::Error>;
}

#[axum::async_trait]
impl PostRepository for Database {
	async fn save_post(&self, post: &CreatePostInput) -> Result<Post, sqlx::Error> {
		sqlx::query_as::<_, Post>(
			r#"
				INSERT INTO posts (name, description)
				VALUES ($1, $2)
				RETURNING id, name, description
			"#,
		)
		.bind(&post.name)
		.bind(&post.description)
		.fetch_one(self)
		.await
	}

	async fn delete_post(&self, id: i32) -> Result<(), sqlx::Error> {
		sqlx::query("DELETE FROM posts WHERE id = $1")
			.bind(id)
			.execute(self)
			.await?;

		Ok(())
	}

	async fn find_all_posts(&self) -> Result<Vec<Post>, sqlx::Error> {
		sqlx::query_as::<_, Post>("SELECT id, name, description FROM posts ORDER BY id")
			.fetch_all(self)
			.await
	}

	async fn post_exists(&self, id: i32) -> Result<bool, sqlx::Error> {
		sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM posts WHERE id = $1)")
			.bind(id)
			.fetch_one(self)
			.await
	}
}

#[cfg(test)]
mod test {
	use crate::Database;

	use super::{CreatePostInput, PostRepository};

	fn input(name: &str, description: Option<&str>) -> CreatePostInput {
		CreatePostInput {
			name: name.into(),
			description: description.map(Into::into),
		}
	}

	#[sqlx::test]
	#[ignore = "needs a PostgreSQL server in DATABASE_URL"]
	async fn test_save_and_find(pool: Database) {
		let first = pool.save_post(&input("A", None)).await.unwrap();
		let second = pool.save_post(&input("B", Some("d"))).await.unwrap();

		assert!(first.id > 0);
		assert!(second.id > first.id);
		assert_eq!(second.description.as_deref(), Some("d"));

		let posts = pool.find_all_posts().await.unwrap();

		assert_eq!(posts, vec![first, second]);
	}

	#[sqlx::test]
	#[ignore = "needs a PostgreSQL server in DATABASE_URL"]
	async fn test_delete(pool: Database) {
		let post = pool.save_post(&input("A", None)).await.unwrap();

		assert!(pool.post_exists(post.id).await.unwrap());

		pool.delete_post(post.id).await.unwrap();

		assert!(!pool.post_exists(post.id).await.unwrap());
		assert!(pool.find_all_posts().await.unwrap().is_empty());

		// Deleting again is a no-op.
		pool.delete_post(post.id).await.unwrap();
	}

	#[sqlx::test]
	#[ignore = "needs a PostgreSQL server in DATABASE_URL"]
	async fn test_name_length_is_enforced_by_the_schema(pool: Database) {
		let name = "a".repeat(256);

		assert!(pool.save_post(&input(&name, None)).await.is_err());
	}
}
