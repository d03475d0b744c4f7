pub mod run;
pub mod seen;
