mod alert_routes_tests;
mod analyze_routes_tests;
mod dashboard_tests;
