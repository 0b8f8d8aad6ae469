mod assignments_test;
mod classes_test;
mod health_test;
