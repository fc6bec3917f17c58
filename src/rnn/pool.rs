/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : 按 batch 维度并行的工作线程池
 *
 * - 线程池在构建时按核数创建一次，之后在同一内核实例的所有调用间复用
 * - 每个时间步把 batch 切成连续的行块，每块作为一个任务提交；
 *   `run_tasks`在所有任务完成后才返回，即时间步之间的屏障
 * - 同一个池上的多次调用整体串行：提交任务前必须先取得`PoolSession`，
 *   它持有调用锁直到被 drop，因此两次调用的任务永远不会交错
 */

use crate::errors::GruError;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// [`WorkerPool`]的配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// 工作线程数，默认等于可用核数
    pub num_threads: usize,
    /// 每个任务处理的 batch 行数；`None`表示把 batch 平均分给所有线程。
    /// 只影响吞吐，不影响结果
    pub rows_per_task: Option<usize>,
    /// 线程名前缀
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get().max(1),
            rows_per_task: None,
            thread_name_prefix: "only-gru".to_string(),
        }
    }
}

/// GRU 内核持有的线程池
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    config: PoolConfig,
    invocation: Mutex<()>,
}

impl WorkerPool {
    pub fn new(config: PoolConfig) -> Result<Self, GruError> {
        if config.num_threads == 0 {
            return Err(GruError::invalid_attribute("num_threads", "须为正整数"));
        }
        if config.rows_per_task == Some(0) {
            return Err(GruError::invalid_attribute("rows_per_task", "须为正整数"));
        }

        let prefix = config.thread_name_prefix.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.num_threads)
            .thread_name(move |idx| format!("{prefix}-{idx}"))
            .build()?;

        Ok(Self {
            pool,
            config,
            invocation: Mutex::new(()),
        })
    }

    pub fn with_defaults() -> Result<Self, GruError> {
        Self::new(PoolConfig::default())
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn num_threads(&self) -> usize {
        self.config.num_threads
    }

    /// 给定 batch 大小时每个任务的行数（至少为1）
    pub fn rows_per_task(&self, batch_size: usize) -> usize {
        self.config
            .rows_per_task
            .unwrap_or_else(|| batch_size.div_ceil(self.config.num_threads))
            .max(1)
    }

    /// 开始一次调用：阻塞直到此前的调用结束。
    ///
    /// 锁只保护"同一时刻只有一次调用在提交任务"这一点，不保护任何数据，
    /// 因此某次调用 panic 导致的锁中毒可以直接忽略。
    pub fn session(&self) -> PoolSession<'_> {
        let guard = self
            .invocation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        PoolSession {
            pool: self,
            _guard: guard,
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("num_threads", &self.config.num_threads)
            .field("rows_per_task", &self.config.rows_per_task)
            .field("thread_name_prefix", &self.config.thread_name_prefix)
            .finish()
    }
}

/// 一次调用对线程池的独占使用权
pub struct PoolSession<'p> {
    pool: &'p WorkerPool,
    _guard: MutexGuard<'p, ()>,
}

impl PoolSession<'_> {
    pub fn rows_per_task(&self, batch_size: usize) -> usize {
        self.pool.rows_per_task(batch_size)
    }

    pub fn num_threads(&self) -> usize {
        self.pool.num_threads()
    }

    /// 把每个任务提交给线程池，全部完成后才返回
    pub fn run_tasks<'s, F>(&self, tasks: Vec<F>)
    where
        F: FnOnce() + Send + 's,
    {
        self.pool.pool.scope(|scope| {
            for task in tasks {
                scope.spawn(move |_| task());
            }
        });
    }
}
