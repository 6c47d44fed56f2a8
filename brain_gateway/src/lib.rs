pub mod configuration;
pub mod controllers;
pub mod domain;
pub mod handlers;
pub mod middlewares;
pub mod ports;
pub mod repositories;
pub mod startup;
