/// Catalog domain types
mod genre;
mod movie;
mod pagination;
mod review;
mod token_pair;
mod user;

pub use genre::Genre;
pub use movie::{Movie, MovieDetails};
pub use pagination::{Page, PageParams};
pub use review::Review;
pub use token_pair::{StoredTokenPair, TokenPair};
pub use user::{Role, User, UserResponse, UserRow};
