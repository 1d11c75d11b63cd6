//! Mock implementations for external dependencies
//! This module contains mock objects used for testing

use mockall::mock;
use rileybot::MemberCount;

// Stand-in for the guild cache lookup done by the `vote` command
mock! {
    pub Members {}

    impl MemberCount for Members {
        fn member_count(&self) -> Option<u64>;
    }
}

/// Creates a member count provider that must be queried exactly `times` times
pub fn members_returning(count: Option<u64>, times: usize) -> MockMembers {
    let mut mock = MockMembers::new();
    mock.expect_member_count().times(times).return_const(count);
    mock
}
