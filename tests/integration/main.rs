mod common;
mod health_test;
mod wizard_http_test;
