pub(crate) mod assistant;
pub(crate) mod dashboard;
pub(crate) mod expenses;
