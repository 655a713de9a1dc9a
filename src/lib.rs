//! blog-server - A small JSON API for blog articles and users
//!
//! This library provides the routing, services and storage layers; the
//! `blog-server` binary wires them to a listener.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
