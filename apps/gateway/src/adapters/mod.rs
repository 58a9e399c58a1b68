//! SeaORM adapters. Functions here are generic over `ConnectionTrait` so the
//! same code runs against the pool or an open transaction, and return raw
//! `DbErr`; the repos layer translates errors.

pub mod articles_sea;
pub mod users_sea;
