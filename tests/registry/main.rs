mod common;
mod concurrency;
mod failover;
mod loading;
mod ordering;
mod properties;
