//! 顾问流水线集成测试
//!
//! 测试范围：
//! - 热集容量约束与收益排序
//! - 交互索引的分区归并
//! - 零收益不变式
//! - 用户投票与推荐输出
//! - 推荐日志与离线最优调度重建

mod common;

use common::assertions::{assert_count, assert_err_with, assert_ok};
use common::fixtures::{index_def, test_config, SyntheticQuery};
use indextune::advisor::WfitAdvisor;
use indextune::config::Config;
use indextune::core::IndexId;

// ==================== 热集选择 ====================

#[test]
fn test_hot_set_bounded_by_cap_keeps_top_benefit() {
    let mut advisor = assert_ok(WfitAdvisor::new(Config {
        max_hot_set_size: 2,
        ..test_config()
    }));
    let a = advisor.add_candidate(&index_def("idx_a", "orders", "o_orderdate", 10.0));
    let b = advisor.add_candidate(&index_def("idx_b", "orders", "o_custkey", 10.0));
    let c = advisor.add_candidate(&index_def("idx_c", "lineitem", "l_shipdate", 10.0));

    // 三条语句各惠及一个不同的索引，净收益 a > b > c，互不交互
    assert_ok(advisor.analyze(&SyntheticQuery::new("q_a", 100.0).with_benefit(a, 40.0)));
    assert_ok(advisor.analyze(&SyntheticQuery::new("q_b", 100.0).with_benefit(b, 30.0)));
    assert_ok(advisor.analyze(
        &SyntheticQuery::new("q_c", 100.0)
            .with_benefit(c, 5.0)
            .with_maintenance(c, 1.0),
    ));

    let hot = advisor.hot_set();
    assert!(hot.len() <= 2, "热集不得超过容量上限");
    assert!(hot.contains(a), "收益最高的索引应该在热集中");
    assert!(hot.contains(b), "收益次高的索引应该在热集中");
    assert!(!hot.contains(c), "收益最低的索引应该被挤出热集");
}

// ==================== 分区归并 ====================

#[test]
fn test_interacting_indexes_share_subset() {
    let mut advisor = assert_ok(WfitAdvisor::new(test_config()));
    let a = advisor.add_candidate(&index_def("idx_a", "orders", "o_orderdate", 10.0));
    let b = advisor.add_candidate(&index_def("idx_b", "orders", "o_custkey", 10.0));

    let query = SyntheticQuery::new("q_join", 100.0)
        .with_benefit(a, 10.0)
        .with_benefit(b, 10.0)
        .with_interaction(a, b, 5.0);
    assert_ok(advisor.analyze(&query));

    let partitions = advisor.partitions();
    let subset_a = partitions.subset_containing(a).expect("索引 a 应该已分区");
    let subset_b = partitions.subset_containing(b).expect("索引 b 应该已分区");
    assert_eq!(subset_a, subset_b, "交互度超过阈值的索引应该共享子集");
}

#[test]
fn test_unrelated_indexes_stay_in_separate_subsets() {
    let mut advisor = assert_ok(WfitAdvisor::new(test_config()));
    let a = advisor.add_candidate(&index_def("idx_a", "orders", "o_orderdate", 10.0));
    let b = advisor.add_candidate(&index_def("idx_b", "lineitem", "l_shipdate", 10.0));

    let query = SyntheticQuery::new("q_scan", 100.0)
        .with_benefit(a, 10.0)
        .with_benefit(b, 10.0);
    assert_ok(advisor.analyze(&query));

    let partitions = advisor.partitions();
    assert_ne!(
        partitions.subset_containing(a).expect("索引 a 应该已分区"),
        partitions.subset_containing(b).expect("索引 b 应该已分区"),
        "无交互的索引不应共享状态空间"
    );
}

// ==================== 零收益不变式 ====================

#[test]
fn test_flat_cost_query_does_not_move_recommendation() {
    let mut advisor = assert_ok(WfitAdvisor::new(test_config()));
    let a = advisor.add_candidate(&index_def("idx_a", "orders", "o_orderdate", 10.0));

    let beneficial = SyntheticQuery::new("q_good", 50.0).with_benefit(a, 40.0);
    assert_ok(advisor.analyze(&beneficial));
    assert_ok(advisor.analyze(&beneficial));
    let before: Vec<IndexId> = advisor.recommendation().iter().map(|i| i.id).collect();
    assert_eq!(before, vec![a]);

    // 所有配置同价的语句：转移只有代价没有收益，推荐必须原地不动
    let flat = SyntheticQuery::new("q_flat", 30.0);
    assert_ok(advisor.analyze(&flat));
    let after: Vec<IndexId> = advisor.recommendation().iter().map(|i| i.id).collect();
    assert_eq!(before, after);
}

// ==================== 用户投票 ====================

#[test]
fn test_positive_vote_shows_up_in_recommendation() {
    let mut advisor = assert_ok(WfitAdvisor::new(test_config()));
    let a = advisor.add_candidate(&index_def("idx_a", "orders", "o_orderdate", 10.0));

    // 低收益语句：索引进入热集但不会被主动推荐
    assert_ok(advisor.analyze(&SyntheticQuery::new("q_weak", 100.0).with_benefit(a, 0.5)));
    let ids: Vec<IndexId> = advisor.recommendation().iter().map(|i| i.id).collect();
    assert!(ids.is_empty());

    assert_ok(advisor.positive_vote(a));
    let ids: Vec<IndexId> = advisor.recommendation().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![a], "正向投票之后推荐必须立即包含该索引");
}

#[test]
fn test_vote_on_unpartitioned_index_fails() {
    let mut advisor = assert_ok(WfitAdvisor::new(test_config()));
    let a = advisor.add_candidate(&index_def("idx_a", "orders", "o_orderdate", 10.0));

    // 尚无任何语句，索引不属于任何子集
    assert_err_with(advisor.positive_vote(a), "不属于任何子集");
}

// ==================== 推荐日志 ====================

#[test]
fn test_log_records_diffs_and_totals() {
    let mut advisor = assert_ok(WfitAdvisor::new(test_config()));
    let a = advisor.add_candidate(&index_def("idx_a", "orders", "o_orderdate", 10.0));

    let beneficial = SyntheticQuery::new("q_good", 50.0).with_benefit(a, 40.0);
    let first = assert_ok(advisor.analyze(&beneficial));
    assert_eq!(first.created, vec![a]);
    assert!((first.transition_cost - 10.0).abs() < 1e-9);

    let second = assert_ok(advisor.analyze(&beneficial));
    assert!(second.created.is_empty());
    assert!((second.transition_cost - 0.0).abs() < 1e-9);

    let log = advisor.log();
    assert_count(log.entries(), 2, "日志条目");
    assert!((log.total_transition_cost() - 10.0).abs() < 1e-9);
    let report = log.render();
    assert!(report.contains("合计"));
}

// ==================== 离线最优调度 ====================

#[test]
fn test_optimal_schedule_reconstruction_with_history() {
    let mut advisor = assert_ok(WfitAdvisor::new(Config {
        keep_history: true,
        ..test_config()
    }));
    let a = advisor.add_candidate(&index_def("idx_a", "orders", "o_orderdate", 10.0));

    let beneficial = SyntheticQuery::new("q_good", 50.0).with_benefit(a, 40.0);
    assert_ok(advisor.analyze(&beneficial));
    assert_ok(advisor.analyze(&beneficial));
    assert_ok(advisor.analyze(&beneficial));

    let schedule = advisor
        .work_function()
        .optimal_schedule()
        .expect("历史记录应该开启");
    // 首条语句触发了一次重分区，历史从那之后开始
    assert_count(&schedule, 3, "调度步");
    assert!(
        schedule.iter().all(|config| config.contains(a)),
        "收益远超创建代价时，离线最优全程物化该索引"
    );

    // 空配置代价按语句累计
    let null_total = advisor
        .work_function()
        .null_cost_total()
        .expect("历史记录应该开启");
    assert!((null_total - 150.0).abs() < 1e-9);
}
