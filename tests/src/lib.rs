#[cfg(test)]
mod discovery {
    mod integration;
}
