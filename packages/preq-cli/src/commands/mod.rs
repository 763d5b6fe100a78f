pub mod batch;
pub mod classifiers;
pub mod run;
pub mod validate;
