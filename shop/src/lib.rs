pub mod entities;
pub mod executable_utils;
pub mod model;
pub mod notify;
pub mod queue;
pub mod report;
pub mod service;
pub mod storage;
pub mod telegram;
pub mod worker;
