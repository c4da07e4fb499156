//! Checks that the test tree keeps pace with the source tree
