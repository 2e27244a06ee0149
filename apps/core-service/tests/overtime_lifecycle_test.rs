//! 残業申請ライフサイクルの統合テスト
//!
//! ユースケースを通して、申請から計上までの経路と取消・再開の分岐を検証する。
//! リポジトリはインメモリモックを使う。

use chrono::Duration;
use overtimeflow_core_service::{
    error::CoreError,
    test_utils::OvertimeTestBuilder,
    usecase::{CreateOvertimeInput, SkipReason},
};
use overtimeflow_domain::{
    department::Department,
    overtime::{OvertimeAction, OvertimeStatus},
    role::Role,
    session::Actor,
    value_objects::{Headcount, WorkWindow},
};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_物流以外は事前承認から計上まで進む() {
    let builder = OvertimeTestBuilder::new();
    let setup = builder.build();
    let requester = builder.requester();
    let responsible = builder.actor(&[Role::Employee]);

    let created = setup
        .sut
        .create_request(
            CreateOvertimeInput {
                department:           Department::new("assembly").unwrap(),
                responsible_employee: responsible.user_id().clone(),
                window:               WorkWindow::new(
                    builder.now(),
                    builder.now() + Duration::hours(4),
                )
                .unwrap(),
                number_of_employees:  Headcount::new(6, "人数").unwrap(),
                number_of_shifts:     Headcount::new(2, "シフト数").unwrap(),
                reason:               None,
            },
            &requester,
        )
        .await
        .unwrap();
    let id = created.id().clone();

    let steps = [
        (OvertimeAction::PreApprove, builder.actor(&[Role::ProductionManager]), OvertimeStatus::PreApproved),
        (OvertimeAction::Approve, builder.actor(&[Role::PlantManager]), OvertimeStatus::Approved),
        (OvertimeAction::Complete, responsible.clone(), OvertimeStatus::Completed),
        (OvertimeAction::MarkAccounted, builder.actor(&[Role::Hr]), OvertimeStatus::Accounted),
    ];
    for (action, actor, expected) in steps {
        let updated = setup
            .sut
            .transition(action, id.clone(), &actor, None)
            .await
            .unwrap();
        assert_eq!(updated.status(), expected);
    }

    let accounted = setup.sut.get_request(&id).await.unwrap();
    assert_eq!(accounted.version().as_u32(), 5);
    assert!(accounted.pre_approved().is_some());
    assert_eq!(accounted.completed().unwrap().by, *responsible.user_id());
}

#[tokio::test]
async fn test_計上済みは管理者でもどの操作も受け付けない() {
    let builder = OvertimeTestBuilder::new();
    let setup = builder.build();
    let admin = builder.actor(&[Role::Admin]);
    let request = builder.pending_request("logistics");
    setup.repo.add_request(request.clone());
    let id = request.id().clone();

    for action in [
        OvertimeAction::Approve,
        OvertimeAction::Complete,
        OvertimeAction::MarkAccounted,
    ] {
        setup
            .sut
            .transition(action, id.clone(), &admin, None)
            .await
            .unwrap();
    }

    for action in [
        OvertimeAction::PreApprove,
        OvertimeAction::Approve,
        OvertimeAction::Complete,
        OvertimeAction::MarkAccounted,
        OvertimeAction::Cancel,
        OvertimeAction::Reactivate,
    ] {
        let result = setup.sut.transition(action, id.clone(), &admin, None).await;
        assert!(
            matches!(result, Err(CoreError::InvalidStatus(_))),
            "{action} should be rejected"
        );
    }
}

#[tokio::test]
async fn test_取消と再開を経て承認をやり直せる() {
    let builder = OvertimeTestBuilder::new();
    let setup = builder.build();
    let request = builder.pending_request("logistics");
    setup.repo.add_request(request.clone());
    let id = request.id().clone();
    let plant_manager = builder.actor(&[Role::PlantManager]);

    setup
        .sut
        .transition(OvertimeAction::Approve, id.clone(), &plant_manager, None)
        .await
        .unwrap();
    setup
        .sut
        .transition(OvertimeAction::Cancel, id.clone(), &builder.requester(), None)
        .await
        .unwrap();

    // 工場長は再開できない
    let denied = setup
        .sut
        .transition(OvertimeAction::Reactivate, id.clone(), &plant_manager, None)
        .await;
    assert!(matches!(denied, Err(CoreError::Forbidden(_))));

    let reactivated = setup
        .sut
        .transition(
            OvertimeAction::Reactivate,
            id.clone(),
            &builder.actor(&[Role::Hr]),
            None,
        )
        .await
        .unwrap();
    assert_eq!(reactivated.status(), OvertimeStatus::Pending);
    assert_eq!(reactivated.approved(), None);
    assert_eq!(reactivated.canceled(), None);

    let approved_again = setup
        .sut
        .transition(OvertimeAction::Approve, id, &plant_manager, None)
        .await
        .unwrap();
    assert_eq!(approved_again.status(), OvertimeStatus::Approved);
    assert!(approved_again.reactivated().is_some());
}

#[tokio::test]
async fn test_一括取消の変更件数は実際に取消された件数と一致する() {
    let builder = OvertimeTestBuilder::new();
    let setup = builder.build();
    let admin = builder.actor(&[Role::Admin]);

    let mut ids = Vec::new();
    for department in ["logistics", "production", "logistics", "production"] {
        let request = builder.pending_request(department);
        ids.push(request.id().clone());
        setup.repo.add_request(request);
    }
    // 1 件目を完了まで、2 件目を取消済みにしておく
    for action in [OvertimeAction::Approve, OvertimeAction::Complete] {
        setup
            .sut
            .transition(action, ids[0].clone(), &admin, None)
            .await
            .unwrap();
    }
    setup
        .sut
        .transition(OvertimeAction::Cancel, ids[1].clone(), &admin, None)
        .await
        .unwrap();

    let group_leader: Actor = builder.actor(&[Role::GroupLeader]);
    let outcome = setup
        .sut
        .bulk_transition(OvertimeAction::Cancel, ids.clone(), &group_leader)
        .await
        .unwrap();

    let canceled_by_group_leader = setup
        .repo
        .requests()
        .iter()
        .filter(|r| r.canceled().is_some_and(|s| s.by == *group_leader.user_id()))
        .count();
    assert_eq!(outcome.modified_count, canceled_by_group_leader);
    assert_eq!(outcome.modified, vec![ids[2].clone(), ids[3].clone()]);
    assert_eq!(
        outcome
            .skipped
            .iter()
            .map(|s| s.reason)
            .collect::<Vec<_>>(),
        vec![
            SkipReason::InvalidStatus(OvertimeStatus::Completed),
            SkipReason::InvalidStatus(OvertimeStatus::Canceled),
        ]
    );
}
