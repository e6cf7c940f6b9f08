pub type Size = usize; //for lengths and capacities

///Page index (assumes consistent page sizes)
pub type Page = usize;
