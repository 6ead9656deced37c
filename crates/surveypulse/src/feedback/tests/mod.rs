mod common;

mod trend;
