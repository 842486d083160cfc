mod admission_test;
mod e2e_test;
mod lifecycle_test;
