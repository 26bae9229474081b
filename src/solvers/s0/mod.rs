//! Deterministic Solver Registry — S0: pattern-matches a task to a
//! hand-written template and emits exact source. Grounded on
//! `code_solver.py::solve_deterministic`'s ordered dispatch loop with
//! `try/except: continue` — here, `std::panic::catch_unwind` around each
//! matcher gives the same "never a hard error, just a non-match"
//! guarantee.
//!
//! The catalogue below spans arithmetic, strings, lists, graphs (BFS
//! reachability, shortest path, topological sort, cycle detection,
//! bipartite check, union-find), DP (climbing stairs, max subarray,
//! coin change, knapsack, LCS, LIS), combinatorics, intervals, data
//! structures (stack, LRU cache, trie), and number theory; the
//! registry is an ordered `Vec` specifically so new matchers slot in
//! without touching the dispatcher. Matrix operations and free-text
//! aggregation (regex/JSON) categories are not covered — no retrieved
//! training signal gave a concrete wire format to template against.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::task::Task;

type Matcher = fn(&Task) -> Option<String>;

const MATCHERS: &[Matcher] = &[
    solve_two_sum,
    solve_balanced_brackets,
    solve_arithmetic_aggregate,
    solve_string_reverse,
    solve_string_case,
    solve_caesar_cipher,
    solve_list_reverse,
    solve_list_unique,
    solve_running_sum,
    solve_bfs_reachability,
    solve_climbing_stairs,
    solve_max_subarray,
    solve_coin_change,
    solve_permutations,
    solve_activity_selection,
    solve_min_stack,
    solve_rpn_eval,
    solve_gcd_lcm,
    solve_knapsack,
    solve_longest_common_subsequence,
    solve_longest_increasing_subsequence,
    solve_lru_cache,
    solve_trie_ops,
    solve_shortest_path,
    solve_topological_sort,
    solve_cycle_detection,
    solve_bipartite_check,
    solve_union_find,
];

/// Tries each matcher in order; the first to produce a candidate wins.
/// A matcher that panics is treated as a non-match: failing to produce
/// compilable/correct output is a non-match, never a hard error.
pub fn solve_deterministic(task: &Task) -> Option<String> {
    for matcher in MATCHERS {
        if let Ok(Some(code)) = catch_unwind(AssertUnwindSafe(|| matcher(task))) {
            return Some(code);
        }
    }
    None
}

fn desc(task: &Task) -> String {
    format!("{} {}", task.title, task.description).to_lowercase()
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn solve_two_sum(task: &Task) -> Option<String> {
    let d = desc(task);
    if task.category == "algorithms" && contains_any(&d, &["two sum", "two indices", "sum to target"]) {
        return Some(
            r#"
import sys

def main():
    data = sys.stdin.read().split()
    idx = 0
    n = int(data[idx]); idx += 1
    nums = [int(data[idx + i]) for i in range(n)]
    idx += n
    target = int(data[idx])
    seen = {}
    for i, v in enumerate(nums):
        complement = target - v
        if complement in seen:
            print(seen[complement], i)
            return
        seen[v] = i
    print(-1)

main()
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_balanced_brackets(task: &Task) -> Option<String> {
    let d = desc(task);
    if contains_any(&d, &["balanced", "bracket", "parenthes"]) {
        return Some(
            r#"
import sys

def main():
    s = sys.stdin.readline().strip()
    pairs = {')': '(', ']': '[', '}': '{'}
    stack = []
    for ch in s:
        if ch in '([{':
            stack.append(ch)
        elif ch in ')]}':
            if not stack or stack.pop() != pairs[ch]:
                print("no")
                return
    print("yes" if not stack else "no")

main()
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_arithmetic_aggregate(task: &Task) -> Option<String> {
    let d = desc(task);
    if task.category == "algorithms" && contains_any(&d, &["sum of", "average of", "maximum of the", "minimum of the"]) {
        let op = if d.contains("average") {
            "sum(nums) / len(nums) if nums else 0"
        } else if d.contains("maximum") {
            "max(nums) if nums else 0"
        } else if d.contains("minimum") {
            "min(nums) if nums else 0"
        } else {
            "sum(nums)"
        };
        return Some(format!(
            "import sys\n\ndata = sys.stdin.read().split()\nn = int(data[0])\nnums = [int(x) for x in data[1:1 + n]]\nresult = {}\nprint(result)\n",
            op
        ));
    }
    None
}

fn solve_string_reverse(task: &Task) -> Option<String> {
    let d = desc(task);
    if contains_any(&d, &["reverse the string", "reverse a string"]) {
        return Some("import sys\nprint(sys.stdin.readline().rstrip('\\n')[::-1])\n".to_string());
    }
    None
}

fn solve_string_case(task: &Task) -> Option<String> {
    let d = desc(task);
    if contains_any(&d, &["uppercase", "upper case"]) {
        return Some("import sys\nprint(sys.stdin.readline().rstrip('\\n').upper())\n".to_string());
    }
    if contains_any(&d, &["lowercase", "lower case"]) {
        return Some("import sys\nprint(sys.stdin.readline().rstrip('\\n').lower())\n".to_string());
    }
    None
}

fn solve_caesar_cipher(task: &Task) -> Option<String> {
    let d = desc(task);
    if contains_any(&d, &["caesar", "shift cipher"]) {
        return Some(
            r#"
import sys

def main():
    line = sys.stdin.readline().strip()
    shift = int(sys.stdin.readline().strip())
    out = []
    for ch in line:
        if ch.isalpha():
            base = ord('A') if ch.isupper() else ord('a')
            out.append(chr((ord(ch) - base + shift) % 26 + base))
        else:
            out.append(ch)
    print(''.join(out))

main()
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_list_reverse(task: &Task) -> Option<String> {
    let d = desc(task);
    if contains_any(&d, &["reverse the list", "reverse an array"]) {
        return Some("import sys\ndata = sys.stdin.read().split()\nn = int(data[0])\nnums = data[1:1+n]\nprint(' '.join(reversed(nums)))\n".to_string());
    }
    None
}

fn solve_list_unique(task: &Task) -> Option<String> {
    let d = desc(task);
    if contains_any(&d, &["remove duplicates", "unique elements", "de-duplicate"]) {
        return Some(
            r#"
import sys

data = sys.stdin.read().split()
n = int(data[0])
nums = data[1:1 + n]
seen = set()
out = []
for x in nums:
    if x not in seen:
        seen.add(x)
        out.append(x)
print(' '.join(out))
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_running_sum(task: &Task) -> Option<String> {
    let d = desc(task);
    if contains_any(&d, &["running sum", "prefix sum"]) {
        return Some(
            r#"
import sys

data = sys.stdin.read().split()
n = int(data[0])
nums = [int(x) for x in data[1:1 + n]]
total = 0
out = []
for x in nums:
    total += x
    out.append(str(total))
print(' '.join(out))
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_bfs_reachability(task: &Task) -> Option<String> {
    let d = desc(task);
    if task.category == "graphs" && contains_any(&d, &["reachable", "reachability", "can reach"]) {
        return Some(
            r#"
import sys
from collections import deque, defaultdict

def main():
    data = sys.stdin.read().split('\n')
    n, m = map(int, data[0].split())
    graph = defaultdict(list)
    for i in range(1, m + 1):
        u, v = map(int, data[i].split())
        graph[u].append(v)
    src, dst = map(int, data[m + 1].split())
    visited = {src}
    queue = deque([src])
    while queue:
        node = queue.popleft()
        if node == dst:
            print("yes")
            return
        for nxt in graph[node]:
            if nxt not in visited:
                visited.add(nxt)
                queue.append(nxt)
    print("yes" if src == dst else "no")

main()
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_climbing_stairs(task: &Task) -> Option<String> {
    let d = desc(task);
    if contains_any(&d, &["climbing stairs", "climb stairs", "ways to reach the top"]) {
        return Some(
            r#"
import sys

n = int(sys.stdin.readline().strip())
a, b = 1, 1
for _ in range(n):
    a, b = b, a + b
print(a)
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_max_subarray(task: &Task) -> Option<String> {
    let d = desc(task);
    if contains_any(&d, &["maximum subarray", "largest sum contiguous"]) {
        return Some(
            r#"
import sys

data = sys.stdin.read().split()
n = int(data[0])
nums = [int(x) for x in data[1:1 + n]]
best = cur = nums[0]
for x in nums[1:]:
    cur = max(x, cur + x)
    best = max(best, cur)
print(best)
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_coin_change(task: &Task) -> Option<String> {
    let d = desc(task);
    if contains_any(&d, &["coin change", "fewest coins", "minimum coins"]) {
        return Some(
            r#"
import sys

data = sys.stdin.read().split('\n')
coins = [int(x) for x in data[0].split()]
amount = int(data[1].strip())
INF = float('inf')
dp = [0] + [INF] * amount
for a in range(1, amount + 1):
    for c in coins:
        if c <= a and dp[a - c] + 1 < dp[a]:
            dp[a] = dp[a - c] + 1
print(dp[amount] if dp[amount] != INF else -1)
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_permutations(task: &Task) -> Option<String> {
    let d = desc(task);
    if contains_any(&d, &["all permutations", "permute the"]) {
        return Some(
            r#"
import sys
from itertools import permutations

items = sys.stdin.readline().split()
for perm in permutations(items):
    print(' '.join(perm))
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_activity_selection(task: &Task) -> Option<String> {
    let d = desc(task);
    if contains_any(&d, &["activity selection", "maximum number of non-overlapping", "schedule the most"]) {
        return Some(
            r#"
import sys

data = sys.stdin.read().split('\n')
n = int(data[0])
intervals = []
for i in range(1, n + 1):
    s, e = map(int, data[i].split())
    intervals.append((e, s))
intervals.sort()
count = 0
last_end = float('-inf')
for end, start in intervals:
    if start >= last_end:
        count += 1
        last_end = end
print(count)
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_min_stack(task: &Task) -> Option<String> {
    let d = desc(task);
    if contains_any(&d, &["min stack", "minimum stack"]) {
        return Some(
            r#"
import sys

def main():
    lines = sys.stdin.read().splitlines()
    stack = []
    mins = []
    out = []
    for line in lines:
        parts = line.split()
        if not parts:
            continue
        op = parts[0]
        if op == "push":
            v = int(parts[1])
            stack.append(v)
            mins.append(v if not mins else min(v, mins[-1]))
        elif op == "pop":
            if stack:
                stack.pop()
                mins.pop()
        elif op == "top":
            out.append(str(stack[-1]) if stack else "empty")
        elif op == "min":
            out.append(str(mins[-1]) if mins else "empty")
    print('\n'.join(out))

main()
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_rpn_eval(task: &Task) -> Option<String> {
    let d = desc(task);
    if contains_any(&d, &["reverse polish", "rpn", "postfix expression"]) {
        return Some(
            r#"
import sys

tokens = sys.stdin.read().split()
stack = []
for tok in tokens:
    if tok in ('+', '-', '*', '/'):
        b = stack.pop()
        a = stack.pop()
        if tok == '+':
            stack.append(a + b)
        elif tok == '-':
            stack.append(a - b)
        elif tok == '*':
            stack.append(a * b)
        else:
            stack.append(int(a / b))
    else:
        stack.append(int(tok))
print(stack[-1])
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_gcd_lcm(task: &Task) -> Option<String> {
    let d = desc(task);
    if contains_any(&d, &["greatest common divisor", "gcd", "lowest common multiple", "lcm"]) {
        let wants_lcm = d.contains("lcm") || d.contains("lowest common multiple");
        let body = if wants_lcm {
            "print(a * b // gcd)"
        } else {
            "print(gcd)"
        };
        return Some(format!(
            "import sys\nimport math\n\na, b = map(int, sys.stdin.read().split())\ngcd = math.gcd(a, b)\n{}\n",
            body
        ));
    }
    None
}

fn solve_knapsack(task: &Task) -> Option<String> {
    let d = desc(task);
    if contains_any(&d, &["knapsack", "0/1 knapsack"]) {
        return Some(
            r#"
import sys

data = sys.stdin.read().split('\n')
n, capacity = map(int, data[0].split())
weights = list(map(int, data[1].split()))
values = list(map(int, data[2].split()))
dp = [0] * (capacity + 1)
for i in range(n):
    for w in range(capacity, weights[i] - 1, -1):
        dp[w] = max(dp[w], dp[w - weights[i]] + values[i])
print(dp[capacity])
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_longest_common_subsequence(task: &Task) -> Option<String> {
    let d = desc(task);
    if contains_any(&d, &["longest common subsequence", "lcs"]) {
        return Some(
            r#"
import sys

data = sys.stdin.read().splitlines()
a, b = data[0], data[1]
dp = [[0] * (len(b) + 1) for _ in range(len(a) + 1)]
for i in range(1, len(a) + 1):
    for j in range(1, len(b) + 1):
        if a[i - 1] == b[j - 1]:
            dp[i][j] = dp[i - 1][j - 1] + 1
        else:
            dp[i][j] = max(dp[i - 1][j], dp[i][j - 1])
print(dp[len(a)][len(b)])
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_longest_increasing_subsequence(task: &Task) -> Option<String> {
    let d = desc(task);
    if contains_any(&d, &["longest increasing subsequence"]) {
        return Some(
            r#"
import sys
from bisect import bisect_left

data = sys.stdin.read().split()
n = int(data[0])
nums = [int(x) for x in data[1:1 + n]]
tails = []
for x in nums:
    i = bisect_left(tails, x)
    if i == len(tails):
        tails.append(x)
    else:
        tails[i] = x
print(len(tails))
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_lru_cache(task: &Task) -> Option<String> {
    let d = desc(task);
    if contains_any(&d, &["lru cache", "least recently used cache"]) {
        return Some(
            r#"
import sys
from collections import OrderedDict

def main():
    lines = sys.stdin.read().splitlines()
    capacity = int(lines[0].strip())
    cache = OrderedDict()
    out = []
    for line in lines[1:]:
        parts = line.split()
        if not parts:
            continue
        op = parts[0]
        if op == "get":
            key = parts[1]
            if key in cache:
                cache.move_to_end(key)
                out.append(str(cache[key]))
            else:
                out.append("-1")
        elif op == "put":
            key, value = parts[1], parts[2]
            if key in cache:
                cache.move_to_end(key)
            cache[key] = value
            if len(cache) > capacity:
                cache.popitem(last=False)
    print('\n'.join(out))

main()
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_trie_ops(task: &Task) -> Option<String> {
    let d = desc(task);
    if contains_any(&d, &["trie", "prefix tree"]) {
        return Some(
            r#"
import sys

def main():
    lines = sys.stdin.read().splitlines()
    root = {}
    out = []
    for line in lines:
        parts = line.split()
        if not parts:
            continue
        op, word = parts[0], parts[1]
        if op == "insert":
            node = root
            for ch in word:
                node = node.setdefault(ch, {})
            node["$"] = True
        elif op == "search":
            node = root
            for ch in word:
                if ch not in node:
                    node = None
                    break
                node = node[ch]
            out.append("true" if node is not None and "$" in node else "false")
        elif op == "starts_with":
            node = root
            for ch in word:
                if ch not in node:
                    node = None
                    break
                node = node[ch]
            out.append("true" if node is not None else "false")
    print('\n'.join(out))

main()
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_shortest_path(task: &Task) -> Option<String> {
    let d = desc(task);
    if task.category == "graphs" && contains_any(&d, &["shortest path", "dijkstra"]) {
        return Some(
            r#"
import sys
import heapq
from collections import defaultdict

def main():
    data = sys.stdin.read().split('\n')
    n, m = map(int, data[0].split())
    graph = defaultdict(list)
    for i in range(1, m + 1):
        u, v, w = map(int, data[i].split())
        graph[u].append((v, w))
    src, dst = map(int, data[m + 1].split())
    dist = {src: 0}
    pq = [(0, src)]
    while pq:
        d_, u = heapq.heappop(pq)
        if d_ > dist.get(u, float('inf')):
            continue
        for v, w in graph[u]:
            nd = d_ + w
            if nd < dist.get(v, float('inf')):
                dist[v] = nd
                heapq.heappush(pq, (nd, v))
    print(dist.get(dst, -1))

main()
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_topological_sort(task: &Task) -> Option<String> {
    let d = desc(task);
    if task.category == "graphs" && contains_any(&d, &["topological sort", "topological order"]) {
        return Some(
            r#"
import sys
from collections import defaultdict, deque

def main():
    data = sys.stdin.read().split('\n')
    n, m = map(int, data[0].split())
    graph = defaultdict(list)
    indeg = [0] * n
    for i in range(1, m + 1):
        u, v = map(int, data[i].split())
        graph[u].append(v)
        indeg[v] += 1
    queue = deque(i for i in range(n) if indeg[i] == 0)
    order = []
    while queue:
        u = queue.popleft()
        order.append(u)
        for v in graph[u]:
            indeg[v] -= 1
            if indeg[v] == 0:
                queue.append(v)
    print(' '.join(map(str, order)) if len(order) == n else "impossible")

main()
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_cycle_detection(task: &Task) -> Option<String> {
    let d = desc(task);
    if task.category == "graphs" && contains_any(&d, &["detect a cycle", "contains a cycle", "cycle detection"]) {
        return Some(
            r#"
import sys
from collections import defaultdict

def main():
    data = sys.stdin.read().split('\n')
    n, m = map(int, data[0].split())
    graph = defaultdict(list)
    for i in range(1, m + 1):
        u, v = map(int, data[i].split())
        graph[u].append(v)

    WHITE, GRAY, BLACK = 0, 1, 2
    color = [WHITE] * n

    def visit(u):
        color[u] = GRAY
        for v in graph[u]:
            if color[v] == GRAY:
                return True
            if color[v] == WHITE and visit(v):
                return True
        color[u] = BLACK
        return False

    found = any(color[u] == WHITE and visit(u) for u in range(n))
    print("yes" if found else "no")

main()
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_bipartite_check(task: &Task) -> Option<String> {
    let d = desc(task);
    if task.category == "graphs" && contains_any(&d, &["bipartite"]) {
        return Some(
            r#"
import sys
from collections import defaultdict, deque

def main():
    data = sys.stdin.read().split('\n')
    n, m = map(int, data[0].split())
    graph = defaultdict(list)
    for i in range(1, m + 1):
        u, v = map(int, data[i].split())
        graph[u].append(v)
        graph[v].append(u)

    color = [-1] * n
    for start in range(n):
        if color[start] != -1:
            continue
        color[start] = 0
        queue = deque([start])
        while queue:
            u = queue.popleft()
            for v in graph[u]:
                if color[v] == -1:
                    color[v] = 1 - color[u]
                    queue.append(v)
                elif color[v] == color[u]:
                    print("no")
                    return
    print("yes")

main()
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

fn solve_union_find(task: &Task) -> Option<String> {
    let d = desc(task);
    if task.category == "graphs" && contains_any(&d, &["connected components", "union-find", "disjoint set"]) {
        return Some(
            r#"
import sys

def main():
    data = sys.stdin.read().split('\n')
    n, m = map(int, data[0].split())
    parent = list(range(n))

    def find(x):
        while parent[x] != x:
            parent[x] = parent[parent[x]]
            x = parent[x]
        return x

    for i in range(1, m + 1):
        u, v = map(int, data[i].split())
        ru, rv = find(u), find(v)
        if ru != rv:
            parent[ru] = rv

    print(len({find(i) for i in range(n)}))

main()
"#
            .trim_start()
            .to_string(),
        );
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{IoSpec, TaskKind, TestCase};

    fn task(category: &str, title: &str, description: &str) -> Task {
        Task {
            id: "t1".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            difficulty: 3,
            category: category.to_string(),
            hints: vec![],
            tags: vec![],
            kind: TaskKind::Io(IoSpec { test_cases: vec![TestCase::new("", "", "")] }),
        }
    }

    #[test]
    fn two_sum_matches_and_is_pure() {
        let t = task("algorithms", "Two Sum", "Find two indices that sum to target");
        let a = solve_deterministic(&t);
        let b = solve_deterministic(&t);
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn balanced_brackets_matches() {
        let t = task("algorithms", "Balanced Brackets", "Check if the brackets are balanced");
        assert!(solve_deterministic(&t).is_some());
    }

    #[test]
    fn unrecognized_task_is_none() {
        let t = task("algorithms", "Quantum Entanglement Simulator", "simulate quantum entanglement decay curves");
        assert!(solve_deterministic(&t).is_none());
    }

    #[test]
    fn matcher_order_prefers_two_sum_over_generic_arithmetic() {
        let t = task("algorithms", "Two Sum", "Given a list, sum to target using two indices");
        let code = solve_deterministic(&t).unwrap();
        assert!(code.contains("seen"));
    }
}
