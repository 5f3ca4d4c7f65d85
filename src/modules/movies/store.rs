use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Movie, MoviePatch, NewMovie};

/// In-memory, insertion-ordered movie collection.
///
/// Every operation takes the lock exactly once, so a request's
/// read-modify-write is never interleaved with another request's.
#[derive(Debug, Default)]
pub struct MovieStore {
    movies: RwLock<Vec<Movie>>,
}

impl MovieStore {
    pub fn new(movies: Vec<Movie>) -> Self {
        Self {
            movies: RwLock::new(movies),
        }
    }

    /// All movies, or only those filed under `genre` (case-insensitive).
    pub async fn list(&self, genre: Option<&str>) -> Vec<Movie> {
        let movies = self.movies.read().await;
        match genre {
            Some(genre) => movies
                .iter()
                .filter(|movie| movie.has_genre(genre))
                .cloned()
                .collect(),
            None => movies.clone(),
        }
    }

    pub async fn get(&self, id: &str) -> Option<Movie> {
        let movies = self.movies.read().await;
        movies.iter().find(|movie| movie.id == id).cloned()
    }

    /// Append a new movie under a freshly generated UUID v4.
    pub async fn create(&self, data: NewMovie) -> Movie {
        let mut movies = self.movies.write().await;

        let mut id = Uuid::new_v4().to_string();
        while movies.iter().any(|movie| movie.id == id) {
            id = Uuid::new_v4().to_string();
        }

        let movie = Movie::new(id, data);
        movies.push(movie.clone());
        tracing::debug!(movie_id = %movie.id, total = movies.len(), "movie created");
        movie
    }

    /// Remove the movie with `id`, returning it if it existed.
    pub async fn remove(&self, id: &str) -> Option<Movie> {
        let mut movies = self.movies.write().await;
        let index = movies.iter().position(|movie| movie.id == id)?;
        let removed = movies.remove(index);
        tracing::debug!(movie_id = %removed.id, total = movies.len(), "movie deleted");
        Some(removed)
    }

    /// Merge `patch` over the movie with `id` in place.
    pub async fn update(&self, id: &str, patch: MoviePatch) -> Option<Movie> {
        let mut movies = self.movies.write().await;
        let movie = movies.iter_mut().find(|movie| movie.id == id)?;
        let fields = patch.fields();
        movie.apply(patch);
        tracing::debug!(movie_id = %movie.id, ?fields, "movie updated");
        Some(movie.clone())
    }

    pub async fn len(&self) -> usize {
        self.movies.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.movies.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::movies::models::Genre;
    use std::sync::Arc;

    fn new_movie(title: &str, genre: Vec<Genre>) -> NewMovie {
        NewMovie {
            title: title.to_string(),
            year: 2000,
            director: "Someone".to_string(),
            duration: 100,
            poster: "https://example.com/poster.jpg".to_string(),
            genre,
            rate: 5.0,
        }
    }

    fn seeded() -> MovieStore {
        MovieStore::new(vec![
            Movie::new("a", new_movie("Heat", vec![Genre::Crime, Genre::Action])),
            Movie::new("b", new_movie("Amelie", vec![Genre::Comedy])),
            Movie::new("c", new_movie("Alien", vec![Genre::Horror, Genre::SciFi])),
        ])
    }

    #[tokio::test]
    async fn list_filters_by_genre_ignoring_case() {
        let store = seeded();

        assert_eq!(store.list(None).await.len(), 3);

        let crime: Vec<String> = store
            .list(Some("CRIME"))
            .await
            .into_iter()
            .map(|movie| movie.id)
            .collect();
        assert_eq!(crime, vec!["a"]);

        assert_eq!(store.list(Some("sci-fi")).await[0].id, "c");
        assert!(store.list(Some("Western")).await.is_empty());
    }

    #[tokio::test]
    async fn create_appends_with_fresh_id() {
        let store = seeded();

        let created = store.create(new_movie("Tenet", vec![Genre::Action])).await;

        assert!(Uuid::parse_str(&created.id).is_ok());
        assert_eq!(store.len().await, 4);
        let all = store.list(None).await;
        assert_eq!(all.last(), Some(&created));
        assert_eq!(store.get(&created.id).await, Some(created));
    }

    #[tokio::test]
    async fn remove_is_visible_immediately() {
        let store = seeded();

        let removed = store.remove("b").await.unwrap();
        assert_eq!(removed.title, "Amelie");
        assert!(store.get("b").await.is_none());
        assert!(store.remove("b").await.is_none());

        let order: Vec<String> = store.list(None).await.into_iter().map(|m| m.id).collect();
        assert_eq!(order, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn update_merges_in_place() {
        let store = seeded();
        let before = store.get("a").await.unwrap();

        let patch = MoviePatch {
            year: Some(1995),
            ..MoviePatch::default()
        };
        let updated = store.update("a", patch).await.unwrap();

        assert_eq!(updated.year, 1995);
        assert_eq!(updated.title, before.title);
        assert_eq!(updated.genre, before.genre);
        assert_eq!(store.list(None).await[0], updated);
        assert!(store.update("zzz", MoviePatch::default()).await.is_none());
    }

    #[tokio::test]
    async fn concurrent_creates_keep_every_record() {
        let store = Arc::new(MovieStore::default());
        assert!(store.is_empty().await);

        let tasks: Vec<_> = (0..32)
            .map(|n| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .create(new_movie(&format!("Movie {n}"), vec![Genre::Drama]))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let mut ids: Vec<String> = store.list(None).await.into_iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), 32);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 32);
    }
}
