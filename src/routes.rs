pub mod builder;
pub mod catalog;
pub mod query;
pub mod record;

#[cfg(test)]
mod tests {
    mod build;
    mod catalog;
    mod filter;
    mod proptests;
    mod utils;
    mod verify;
}
