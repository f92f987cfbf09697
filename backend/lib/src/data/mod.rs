//! Data module for the shop directory backend

pub mod store;
