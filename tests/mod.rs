mod smoke_tests;

// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - smoke_tests: Config loading and controller basics
// - store_tests: Event store persistence against in-memory and file storage
// - relay_mock: The Gemini client against a local fake model server
// - http_api: The HTTP routes driven through the router
