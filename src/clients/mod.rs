pub mod intra_client;

pub use intra_client::{IntraClient, Semesters};
