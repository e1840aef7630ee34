pub mod helpers;
mod reconcile;
