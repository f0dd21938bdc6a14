/// A failure that ends the run, already phrased for the user.
#[derive(Debug)]
pub struct RunError(pub String);
