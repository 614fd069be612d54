// Test modules for prompt-cache crate
//
// Each source file has a corresponding test file that focuses on business
// logic verification. Provider-specific tests live next to the provider in
// providers/anthropic/tests.
