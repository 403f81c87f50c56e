//! inkstream - a small blog system
//!
//! This library provides the core functionality shared by the three
//! inkstream binaries: the CRUD API server, the SSR front server, and the
//! seed tool.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod seed;
pub mod services;
pub mod ssr;
