#![allow(clippy::float_cmp, clippy::cast_precision_loss)]

mod preconditions;
mod retry;
mod scenarios;
mod stopping;
