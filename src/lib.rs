//! Real-estate listing catalog: storage, advanced search and the public site.

pub mod commands;
pub mod config;
pub mod contact;
pub mod db;
pub mod error;
pub mod models;
pub mod search;
pub mod storage;
pub mod web;
