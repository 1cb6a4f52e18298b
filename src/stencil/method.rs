use clap::ValueEnum;

/// Interior update strategies.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum Method {
    /// Average of the four neighbors of the previous iterate
    #[default]
    Jacobi,

    /// Row-major Gauss-Seidel SOR, coupled to neighbors through the
    /// previous iterate
    GaussSeidel,

    /// Checkerboard SOR, red cells first then black
    RedBlack,

    /// Gauss-Seidel SOR with the north row and west cells received
    /// mid-sweep, matching a single-process sweep exactly
    Pipelined,
}

impl Method {
    /// Name used in the summary line and the result file name.
    pub fn label(&self) -> &'static str {
        match self {
            Method::Jacobi => "Jacobi",
            Method::GaussSeidel => "GaussSeidel",
            Method::RedBlack => "RedBlackSOR",
            Method::Pipelined => "GaussSeidelPipelined",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
