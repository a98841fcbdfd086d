pub mod advisor;
pub mod analytics;
pub mod config;
pub mod output;
pub mod recommend;
pub mod share;
pub mod tree;
pub mod validate;
