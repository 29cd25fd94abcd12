pub mod tower;

#[cfg(test)]
mod tests;
