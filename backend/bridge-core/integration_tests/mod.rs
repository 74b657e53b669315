mod bridge_tests;
mod helpers;
