mod genres;
mod health_check;
mod movies;
mod reviews;
mod users;

pub use genres::{create_genre, delete_genre, get_genre, get_genres, update_genre};
pub use health_check::{health_check, welcome};
pub use movies::{
    create_movie, delete_movie, filter_movies_by_genre, get_movie, get_movies, search_movies, update_movie,
};
pub use reviews::{add_review, delete_review, reviews_by_user, reviews_for_movie};
pub use users::{get_user, get_users, login, refresh, signup};
